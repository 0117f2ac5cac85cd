#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use taskdeck_core::query::{self, Calendar};
use taskdeck_core::{NewTask, Task, TaskId, TaskStats};
use time::macros::{date, datetime};
use time::{Duration, OffsetDateTime};

fn build_tasks(count: u64) -> Vec<Task> {
    let created: OffsetDateTime = datetime!(2024-01-01 09:00 UTC);
    (1..=count)
        .map(|id| {
            let offset = i64::try_from(id % 60).unwrap_or_default() - 30;
            let mut task = Task::create(
                TaskId(id),
                NewTask::new(format!("bench task {id}"))
                    .with_category(if id % 3 == 0 { "personal" } else { "work" })
                    .with_due_date(date!(2024 - 03 - 10) + Duration::days(offset)),
                created,
            );
            if id % 4 == 0 {
                task.set_completed(true, created);
            }
            task
        })
        .collect()
}

fn bucket_benchmark(c: &mut Criterion) {
    let calendar = Calendar::utc(datetime!(2024-03-10 12:00 UTC));
    let mut group = c.benchmark_group("due_buckets");
    for &count in &[100u64, 1_000, 10_000] {
        let tasks = build_tasks(count);
        group.bench_with_input(BenchmarkId::new("stats", count), &tasks, |b, tasks| {
            b.iter(|| black_box(TaskStats::compute(tasks, &calendar)));
        });
        group.bench_with_input(BenchmarkId::new("search", count), &tasks, |b, tasks| {
            b.iter(|| black_box(query::search(tasks, "TASK 9")));
        });
    }
    group.finish();
}

criterion_group!(benches, bucket_benchmark);
criterion_main!(benches);
