//! End-to-end checks of the async service over a manual clock.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration as StdDuration;

use taskdeck_app::{CategoryRepository, Latency, ManualClock, TaskError, TaskRepository, TaskService};
use taskdeck_core::{CategoryId, NewCategory, NewTask, Task, TaskId, TaskPatch, TaskStats};
use time::macros::{date, datetime, offset};
use time::{Duration, OffsetDateTime};

const START: OffsetDateTime = datetime!(2024-03-10 09:00 UTC);

fn service() -> (ManualClock, TaskService<ManualClock>) {
    let clock = ManualClock::new(START);
    let repo = TaskRepository::new(clock.clone());
    (clock, TaskService::new(repo, CategoryRepository::default()))
}

fn ids(tasks: &[Task]) -> Vec<TaskId> {
    tasks.iter().map(|task| task.id).collect()
}

#[tokio::test]
async fn task_due_today_lands_only_in_today() {
    let (_clock, svc) = service();
    let a = svc
        .create(NewTask::new("A").with_due_date(date!(2024-03-10)))
        .await
        .expect("create");

    assert_eq!(ids(&svc.today().await), vec![a.id]);
    assert!(svc.upcoming().await.is_empty());
    assert!(svc.overdue().await.is_empty());
}

#[tokio::test]
async fn day_boundaries_follow_configured_offset() {
    let clock = ManualClock::new(datetime!(2024-03-10 23:30 UTC));
    let svc = TaskService::new(TaskRepository::new(clock), CategoryRepository::default())
        .with_offset(offset!(+9));
    let task = svc
        .create(NewTask::new("late").with_due_date(date!(2024-03-10)))
        .await
        .expect("create");

    // 23:30 UTC is already March 11th at +09:00.
    assert_eq!(ids(&svc.overdue().await), vec![task.id]);
    assert!(svc.today().await.is_empty());
}

#[tokio::test]
async fn starting_second_timer_stops_the_first() {
    let (clock, svc) = service();
    let a = svc.create(NewTask::new("A")).await.expect("create");
    let b = svc.create(NewTask::new("B")).await.expect("create");

    svc.start_timer(a.id).await.expect("start A");
    clock.advance(Duration::seconds(20));
    let b = svc.start_timer(b.id).await.expect("start B");

    let a = svc.get_by_id(a.id).await.expect("A exists");
    assert!(!a.time_tracking.is_running());
    assert_eq!(a.time_tracking.sessions().len(), 1);
    assert_eq!(a.time_tracking.total_time(), 20);
    assert!(b.time_tracking.is_running());
    assert_eq!(svc.running_timer().await.map(|task| task.id), Some(b.id));
}

#[tokio::test]
async fn timer_accounts_sixty_five_seconds() {
    let (clock, svc) = service();
    let task = svc.create(NewTask::new("focus")).await.expect("create");

    svc.start_timer(task.id).await.expect("start");
    clock.advance(Duration::seconds(65));
    assert_eq!(svc.time_spent(task.id).await, Ok(65));
    let task = svc.stop_timer(task.id).await.expect("stop");

    assert_eq!(task.time_tracking.total_time(), 65);
    assert_eq!(task.time_tracking.sessions().len(), 1);
    assert_eq!(task.time_tracking.sessions()[0].duration_seconds, 65);
    assert_eq!(
        svc.stop_timer(task.id).await,
        Err(TaskError::TimerNotRunning(task.id))
    );
}

#[tokio::test]
async fn completion_toggle_sets_and_clears_timestamp() {
    let (clock, svc) = service();
    let task = svc.create(NewTask::new("X")).await.expect("create");
    clock.advance(Duration::minutes(5));

    let done = svc
        .update(task.id, &TaskPatch::completed(true))
        .await
        .expect("complete");
    assert_eq!(done.completed_at, Some(START + Duration::minutes(5)));

    let undone = svc
        .update(task.id, &TaskPatch::completed(false))
        .await
        .expect("reopen");
    assert!(!undone.completed);
    assert!(undone.completed_at.is_none());
}

#[tokio::test]
async fn archive_then_restore_returns_task_to_views() {
    let (_clock, svc) = service();
    let task = svc
        .create(NewTask::new("X").with_due_date(date!(2024-03-12)))
        .await
        .expect("create");

    svc.archive(task.id).await.expect("archive");
    assert!(svc.upcoming().await.is_empty());
    assert_eq!(ids(&svc.archived().await), vec![task.id]);

    let restored = svc.restore(task.id).await.expect("restore");
    assert!(!restored.archived);
    assert!(restored.archived_at.is_none());
    assert_eq!(ids(&svc.upcoming().await), vec![task.id]);
    assert!(svc.archived().await.is_empty());
}

#[tokio::test]
async fn bulk_update_skips_unknown_ids() {
    let (_clock, svc) = service();
    let one = svc.create(NewTask::new("one")).await.expect("create");
    let two = svc.create(NewTask::new("two")).await.expect("create");

    let updated = svc
        .bulk_update(&[one.id, two.id, TaskId(999)], &TaskPatch::completed(true))
        .await;

    assert_eq!(ids(&updated), vec![one.id, two.id]);
    assert!(updated.iter().all(|task| task.completed_at.is_some()));
}

#[tokio::test]
async fn bulk_delete_removes_only_known_ids() {
    let (_clock, svc) = service();
    let keep = svc.create(NewTask::new("keep")).await.expect("create");
    let drop = svc.create(NewTask::new("drop")).await.expect("create");

    let removed = svc.bulk_delete(&[drop.id, TaskId(999_999)]).await;

    assert_eq!(ids(&removed), vec![drop.id]);
    assert_eq!(ids(&svc.get_all().await), vec![keep.id]);
}

#[tokio::test]
async fn bulk_move_retags_tasks() {
    let (_clock, svc) = service();
    let a = svc.create(NewTask::new("a")).await.expect("create");
    let b = svc.create(NewTask::new("b").with_category("home")).await.expect("create");

    let moved = svc.bulk_move_to_category(&[a.id, b.id], "errands").await;
    assert_eq!(moved.len(), 2);
    assert_eq!(ids(&svc.get_by_category("errands").await), vec![a.id, b.id]);
    assert!(svc.get_by_category("home").await.is_empty());
}

#[tokio::test]
async fn stats_on_empty_store_are_zero() {
    let (_clock, svc) = service();
    assert_eq!(svc.stats().await, TaskStats::default());
}

#[tokio::test]
async fn stats_count_buckets_and_rate() {
    let (_clock, svc) = service();
    svc.create(NewTask::new("today").with_due_date(date!(2024-03-10)))
        .await
        .expect("create");
    svc.create(NewTask::new("late").with_due_date(date!(2024-03-01)))
        .await
        .expect("create");
    let done = svc.create(NewTask::new("done")).await.expect("create");
    svc.update(done.id, &TaskPatch::completed(true))
        .await
        .expect("complete");

    let stats = svc.stats().await;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.today_count, 1);
    assert_eq!(stats.overdue_count, 1);
    assert_eq!(stats.completion_rate, 33);
}

#[tokio::test]
async fn missing_ids_fail_without_side_effects() {
    let (_clock, svc) = service();
    let task = svc.create(NewTask::new("only")).await.expect("create");
    let missing = TaskId(42);

    assert_eq!(svc.delete(missing).await, Err(TaskError::NotFound(missing)));
    assert_eq!(
        svc.update(missing, &TaskPatch::completed(true)).await,
        Err(TaskError::NotFound(missing))
    );
    assert_eq!(svc.start_timer(missing).await, Err(TaskError::NotFound(missing)));
    assert_eq!(svc.get_all().await, vec![task]);
}

#[tokio::test]
async fn deleted_ids_are_not_reused() {
    let (_clock, svc) = service();
    let first = svc.create(NewTask::new("first")).await.expect("create");
    svc.delete(first.id).await.expect("delete");
    let second = svc.create(NewTask::new("second")).await.expect("create");
    assert!(second.id > first.id);
}

#[tokio::test]
async fn category_counts_follow_task_tags() {
    let (_clock, svc) = service();
    let work = svc
        .create_category(NewCategory {
            name: "Work".into(),
            ..NewCategory::default()
        })
        .await
        .expect("create category");
    svc.create(NewTask::new("a")).await.expect("create");
    svc.create(NewTask::new("b").with_category("home")).await.expect("create");

    let counts = svc.category_task_counts().await;
    assert_eq!(counts.get(&work.id), Some(&1));

    svc.delete_category(work.id).await.expect("delete category");
    assert!(svc.categories().await.is_empty());
    assert_eq!(svc.get_all().await.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_leave_one_timer_running() {
    let (_clock, svc) = service();
    let mut created = Vec::new();
    for n in 0..8 {
        created.push(svc.create(NewTask::new(format!("task {n}"))).await.expect("create").id);
    }

    let handles: Vec<_> = created
        .iter()
        .map(|&id| {
            let svc = svc.clone();
            tokio::spawn(async move { svc.start_timer(id).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("join").expect("start");
    }

    let running = svc
        .get_all()
        .await
        .into_iter()
        .filter(|task| task.time_tracking.is_running())
        .count();
    assert_eq!(running, 1);
}

#[tokio::test(start_paused = true)]
async fn latency_delays_calls_without_changing_results() {
    let clock = ManualClock::new(START);
    let svc = TaskService::new(TaskRepository::new(clock), CategoryRepository::default())
        .with_latency(Latency::from_millis(250));

    let begin = tokio::time::Instant::now();
    let task = svc.create(NewTask::new("slow")).await.expect("create");
    assert_eq!(svc.get_by_id(task.id).await, Some(task));
    assert!(begin.elapsed() >= StdDuration::from_millis(500));
}

#[tokio::test]
async fn export_reflects_both_stores() {
    let (_clock, svc) = service();
    svc.create(NewTask::new("a")).await.expect("create");
    svc.create_category(NewCategory {
        name: "Home".into(),
        ..NewCategory::default()
    })
    .await
    .expect("create category");

    let (tasks, categories) = svc.export().await;
    assert_eq!(tasks.records.len(), 1);
    assert_eq!(tasks.last_id, TaskId(1));
    assert_eq!(categories.records.len(), 1);
    assert_eq!(categories.last_id, CategoryId(1));
    assert_eq!(svc.search("HOM").await.len(), 0);
    assert_eq!(svc.recent_pending(5).await.len(), 1);
}

#[tokio::test]
async fn export_keeps_high_water_mark_after_deleting_newest() {
    let (_clock, svc) = service();
    svc.create(NewTask::new("a")).await.expect("create");
    let newest = svc.create(NewTask::new("b")).await.expect("create");
    svc.delete(newest.id).await.expect("delete");

    let (tasks, _categories) = svc.export().await;
    assert_eq!(tasks.last_id, newest.id);

    let reloaded = TaskRepository::from_seed(tasks.records, ManualClock::new(START))
        .expect("seed")
        .with_last_id(tasks.last_id);
    let svc = TaskService::new(reloaded, CategoryRepository::default());
    let next = svc.create(NewTask::new("c")).await.expect("create");
    assert_eq!(next.id, TaskId(3));
}

#[tokio::test]
async fn create_reports_exhausted_identifiers() {
    let last = Task::create(TaskId(u64::MAX), NewTask::new("last"), START);
    let repo = TaskRepository::from_seed(vec![last], ManualClock::new(START)).expect("seed");
    let svc = TaskService::new(repo, CategoryRepository::default());

    assert_eq!(
        svc.create(NewTask::new("overflow")).await,
        Err(TaskError::TaskIdsExhausted)
    );
    assert_eq!(svc.get_all().await.len(), 1);
}

#[tokio::test]
async fn timer_reads_do_not_change_the_store() {
    let (clock, svc) = service();
    let task = svc.create(NewTask::new("focus")).await.expect("create");
    svc.start_timer(task.id).await.expect("start");
    clock.advance(Duration::seconds(30));

    let before = svc.get_all().await;
    assert_eq!(svc.time_spent(task.id).await, Ok(30));
    assert_eq!(svc.running_timer().await.map(|task| task.id), Some(task.id));
    assert_eq!(svc.get_all().await, before);
}
