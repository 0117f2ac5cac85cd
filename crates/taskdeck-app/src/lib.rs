//! Application layer for taskdeck.
//!
//! Owns the in-memory task and category stores, the timer rules, bulk
//! operations, configuration, seed files, and the async service facade
//! shared by front ends.

pub mod bulk;
pub mod category_repository;
pub mod clock;
pub mod config;
pub mod error;
pub mod latency;
pub mod seed;
pub mod service;
pub mod task_repository;
pub mod time_tracker;

// Re-exports for convenience
pub use bulk::BulkExecutor;
pub use category_repository::CategoryRepository;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, CalendarConfig, LatencyConfig, StoreConfig};
pub use error::{Result, TaskError};
pub use latency::Latency;
pub use seed::{CategorySeed, Seed, TaskSeed};
pub use service::TaskService;
pub use task_repository::TaskRepository;
pub use time_tracker::TimeTracker;
