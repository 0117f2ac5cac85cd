use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use taskdeck_app::{
    AppConfig, CategoryRepository, Clock, SystemClock, TaskRepository, TaskService, seed,
};
use taskdeck_core::query;
use taskdeck_core::tracking::format_duration;
use taskdeck_core::{
    Category, CategoryId, CategoryPatch, DueDatePatch, NewCategory, NewTask, Task, TaskPatch,
    TaskStats,
};

use crate::{Bucket, BulkCommand, CategoryCommand, Command, LsFormat, TimerCommand};

/// Seed files plus the service loaded from them.
struct Store {
    service: TaskService<SystemClock>,
    tasks_path: PathBuf,
    categories_path: PathBuf,
}

impl Store {
    fn open(config: &AppConfig) -> Result<Self> {
        let tasks_path = config.tasks_path()?;
        let categories_path = config.categories_path()?;

        let task_seed = seed::load_tasks(&tasks_path)?;
        let tasks = TaskRepository::from_seed(task_seed.records, SystemClock)
            .with_context(|| format!("invalid task data in {}", tasks_path.display()))?
            .with_last_id(task_seed.last_id);
        let category_seed = seed::load_categories(&categories_path)?;
        let categories = CategoryRepository::from_seed(category_seed.records)
            .with_context(|| format!("invalid category data in {}", categories_path.display()))?
            .with_last_id(category_seed.last_id);

        let service = TaskService::new(tasks, categories)
            .with_offset(config.calendar.utc_offset()?)
            .with_latency(config.latency());
        Ok(Self {
            service,
            tasks_path,
            categories_path,
        })
    }

    async fn save(&self) -> Result<()> {
        let (tasks, categories) = self.service.export().await;
        seed::save_tasks(&self.tasks_path, &tasks)?;
        seed::save_categories(&self.categories_path, &categories)
    }
}

/// Text to print and whether the stores changed.
#[derive(Debug)]
struct Outcome {
    output: String,
    mutated: bool,
}

impl Outcome {
    const fn read(output: String) -> Self {
        Self {
            output,
            mutated: false,
        }
    }

    const fn write(output: String) -> Self {
        Self {
            output,
            mutated: true,
        }
    }
}

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let store = Store::open(config)?;
    let outcome = execute(command, &store.service).await?;
    if outcome.mutated {
        store.save().await?;
    }
    print!("{}", outcome.output);
    Ok(())
}

async fn execute<C: Clock>(command: Command, service: &TaskService<C>) -> Result<Outcome> {
    let outcome = match command {
        Command::Add {
            title,
            category,
            priority,
            due,
        } => {
            if title.trim().is_empty() {
                bail!("title must not be empty");
            }
            let mut input = NewTask::new(title);
            input.category_id = category;
            input.priority = priority;
            input.due_date = due;
            let task = service.create(input).await?;
            Outcome::write(format!("created task: {} ({})\n", task.id, task.title))
        }
        Command::Ls {
            bucket,
            category,
            search,
            format,
        } => {
            let mut tasks = match bucket {
                Bucket::All => service.get_all().await,
                Bucket::Today => service.today().await,
                Bucket::Upcoming => service.upcoming().await,
                Bucket::Overdue => service.overdue().await,
                Bucket::Completed => service.completed().await,
                Bucket::Archived => service.archived().await,
            };
            if let Some(category) = category {
                tasks = query::by_category(&tasks, &category);
            }
            if let Some(text) = search {
                tasks = query::search(&tasks, &text);
            }
            Outcome::read(render_tasks(&tasks, format)?)
        }
        Command::Recent { limit } => {
            let tasks = service.recent_pending(limit).await;
            Outcome::read(render_tasks(&tasks, LsFormat::Table)?)
        }
        Command::Show { id } => {
            let task = service
                .get_by_id(id)
                .await
                .with_context(|| format!("Task not found: {id}"))?;
            Outcome::read(format!("{}\n", serde_json::to_string_pretty(&task)?))
        }
        Command::Edit {
            id,
            title,
            category,
            priority,
            due,
            clear_due,
        } => {
            let patch = TaskPatch {
                title,
                category_id: category,
                priority,
                due_date: due
                    .map(DueDatePatch::Set)
                    .or_else(|| clear_due.then_some(DueDatePatch::Clear)),
                ..TaskPatch::default()
            };
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            let task = service.update(id, &patch).await?;
            Outcome::write(format!("updated task: {}\n", task.id))
        }
        Command::Done { id } => {
            let task = service.update(id, &TaskPatch::completed(true)).await?;
            Outcome::write(format!("completed task: {}\n", task.id))
        }
        Command::Undone { id } => {
            let task = service.update(id, &TaskPatch::completed(false)).await?;
            Outcome::write(format!("reopened task: {}\n", task.id))
        }
        Command::Rm { id } => {
            let task = service.delete(id).await?;
            Outcome::write(format!("deleted task: {} ({})\n", task.id, task.title))
        }
        Command::Archive { id } => {
            let task = service.archive(id).await?;
            Outcome::write(format!("archived task: {}\n", task.id))
        }
        Command::Restore { id } => {
            let task = service.restore(id).await?;
            Outcome::write(format!("restored task: {}\n", task.id))
        }
        Command::Timer { action } => run_timer(action, service).await?,
        Command::Bulk { action } => run_bulk(action, service).await,
        Command::Stats { format } => Outcome::read(render_stats(&service.stats().await, format)?),
        Command::Category { action } => run_category(action, service).await?,
    };
    Ok(outcome)
}

async fn run_timer<C: Clock>(action: TimerCommand, service: &TaskService<C>) -> Result<Outcome> {
    let outcome = match action {
        TimerCommand::Start { id } => {
            service.start_timer(id).await?;
            Outcome::write(format!("started timer: {id}\n"))
        }
        TimerCommand::Stop { id } => {
            let task = service.stop_timer(id).await?;
            Outcome::write(format!(
                "stopped timer: {id} (total {})\n",
                format_duration(task.time_tracking.total_time())
            ))
        }
        TimerCommand::Pause { id } => {
            let task = service.pause_timer(id).await?;
            Outcome::write(format!(
                "paused timer: {id} (total {})\n",
                format_duration(task.time_tracking.total_time())
            ))
        }
        TimerCommand::Reset { id } => {
            service.reset_timer(id).await?;
            Outcome::write(format!("reset timer: {id}\n"))
        }
        TimerCommand::Spent { id } => {
            let seconds = service.time_spent(id).await?;
            Outcome::read(format!("{}\n", format_duration(seconds)))
        }
        TimerCommand::Status => match service.running_timer().await {
            Some(task) => {
                let seconds = service.time_spent(task.id).await?;
                Outcome::read(format!(
                    "running: {} ({}) {}\n",
                    task.id,
                    task.title,
                    format_duration(seconds)
                ))
            }
            None => Outcome::read("No timer running\n".to_owned()),
        },
    };
    Ok(outcome)
}

async fn run_bulk<C: Clock>(action: BulkCommand, service: &TaskService<C>) -> Outcome {
    let (verb, affected) = match action {
        BulkCommand::Done { ids } => (
            "completed",
            service.bulk_update(&ids, &TaskPatch::completed(true)).await,
        ),
        BulkCommand::Undone { ids } => (
            "reopened",
            service.bulk_update(&ids, &TaskPatch::completed(false)).await,
        ),
        BulkCommand::Rm { ids } => ("deleted", service.bulk_delete(&ids).await),
        BulkCommand::Move { category, ids } => (
            "moved",
            service.bulk_move_to_category(&ids, &category).await,
        ),
    };
    let ids = affected
        .iter()
        .map(|task| task.id.to_string())
        .collect::<Vec<_>>();
    Outcome::write(format!("{verb} {} task(s): {}\n", ids.len(), ids.join(", ")))
}

async fn run_category<C: Clock>(
    action: CategoryCommand,
    service: &TaskService<C>,
) -> Result<Outcome> {
    let outcome = match action {
        CategoryCommand::Ls { format } => {
            let categories = service.categories().await;
            let counts = service.category_task_counts().await;
            let output = match format {
                LsFormat::Table => render_category_table(&categories, |id| {
                    counts.get(&id).copied().unwrap_or_default()
                }),
                LsFormat::Json => format!("{}\n", serde_json::to_string_pretty(&categories)?),
            };
            Outcome::read(output)
        }
        CategoryCommand::Add { name, color, icon } => {
            if name.trim().is_empty() {
                bail!("category name must not be empty");
            }
            let category = service
                .create_category(NewCategory { name, color, icon })
                .await?;
            Outcome::write(format!(
                "created category: {} ({})\n",
                category.id, category.name
            ))
        }
        CategoryCommand::Edit {
            id,
            name,
            color,
            icon,
        } => {
            let category = service
                .update_category(id, &CategoryPatch { name, color, icon })
                .await?;
            Outcome::write(format!("updated category: {}\n", category.id))
        }
        CategoryCommand::Rm { id } => {
            let category = service.delete_category(id).await?;
            Outcome::write(format!(
                "deleted category: {} ({})\n",
                category.id, category.name
            ))
        }
    };
    Ok(outcome)
}

fn render_tasks(tasks: &[Task], format: LsFormat) -> Result<String> {
    match format {
        LsFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(tasks)?)),
        LsFormat::Table if tasks.is_empty() => Ok("No tasks found\n".to_owned()),
        LsFormat::Table => Ok(render_task_table(tasks)),
    }
}

fn render_task_table(tasks: &[Task]) -> String {
    let mut out = String::new();
    out.push_str("ID | Done | Priority | Due | Category | Title | Time\n");
    out.push_str("-- | ---- | -------- | --- | -------- | ----- | ----\n");

    for task in tasks {
        let done = if task.completed { "x" } else { " " };
        let due = task
            .due_date
            .map_or_else(|| "-".to_owned(), |date| date.to_string());
        let mut time = format_duration(task.time_tracking.total_time());
        if task.time_tracking.is_running() {
            time.push_str(" (running)");
        }
        let title = if task.archived {
            format!("{} [archived]", task.title)
        } else {
            task.title.clone()
        };
        let _ = writeln!(
            out,
            "{} | {} | {} | {} | {} | {} | {}",
            task.id, done, task.priority, due, task.category_id, title, time
        );
    }
    out
}

fn render_category_table(categories: &[Category], count: impl Fn(CategoryId) -> usize) -> String {
    if categories.is_empty() {
        return "No categories found\n".to_owned();
    }
    let mut out = String::new();
    out.push_str("ID | Name | Color | Icon | Tasks\n");
    out.push_str("-- | ---- | ----- | ---- | -----\n");
    for category in categories {
        let _ = writeln!(
            out,
            "{} | {} | {} | {} | {}",
            category.id,
            category.name,
            category.color,
            category.icon,
            count(category.id)
        );
    }
    out
}

fn render_stats(stats: &TaskStats, format: LsFormat) -> Result<String> {
    if format == LsFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(stats)?));
    }
    Ok(format!(
        "Total: {}\nCompleted: {}\nPending: {}\nDue today: {}\nOverdue: {}\nCompletion: {}%\n",
        stats.total,
        stats.completed,
        stats.pending,
        stats.today_count,
        stats.overdue_count,
        stats.completion_rate
    ))
}
