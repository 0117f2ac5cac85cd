//! JSON seed files for tasks and categories.
//!
//! A seed file is an object holding the id high-water mark and the records,
//! `{"lastId": 3, "tasks": [...]}`. A bare array of records is also accepted,
//! in which case the high-water mark falls back to the largest stored id.
//! A missing file is an empty collection. Saving writes pretty JSON and
//! creates parent directories as needed; it makes no durability promises.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use taskdeck_core::{Category, CategoryId, Task, TaskId};

const LAST_ID_KEY: &str = "lastId";
const TASKS_KEY: &str = "tasks";
const CATEGORIES_KEY: &str = "categories";

/// Records read from or written to a seed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed<I, T> {
    /// Highest identifier ever handed out, including deleted ones.
    pub last_id: I,
    /// Stored records in file order.
    pub records: Vec<T>,
}

/// Task seed file contents.
pub type TaskSeed = Seed<TaskId, Task>;

/// Category seed file contents.
pub type CategorySeed = Seed<CategoryId, Category>;

impl<I: Default, T> From<Vec<T>> for Seed<I, T> {
    fn from(records: Vec<T>) -> Self {
        Self {
            last_id: I::default(),
            records,
        }
    }
}

/// Load task records from `path`.
///
/// # Errors
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_tasks(path: &Path) -> Result<TaskSeed> {
    load(path, TASKS_KEY)
}

/// Load category records from `path`.
///
/// # Errors
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_categories(path: &Path) -> Result<CategorySeed> {
    load(path, CATEGORIES_KEY)
}

/// Write task records and their high-water mark to `path`.
///
/// # Errors
/// Returns an error when serialization or the write fails.
pub fn save_tasks(path: &Path, seed: &TaskSeed) -> Result<()> {
    save(path, TASKS_KEY, seed)
}

/// Write category records and their high-water mark to `path`.
///
/// # Errors
/// Returns an error when serialization or the write fails.
pub fn save_categories(path: &Path, seed: &CategorySeed) -> Result<()> {
    save(path, CATEGORIES_KEY, seed)
}

fn load<I, T>(path: &Path, key: &str) -> Result<Seed<I, T>>
where
    I: DeserializeOwned + Default,
    T: DeserializeOwned,
{
    if !path.exists() {
        return Ok(Seed::from(Vec::new()));
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Seed::from(Vec::new()));
    }
    parse(&contents, key).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse<I, T>(contents: &str, key: &str) -> Result<Seed<I, T>>
where
    I: DeserializeOwned + Default,
    T: DeserializeOwned,
{
    match serde_json::from_str::<Value>(contents)? {
        records @ Value::Array(_) => Ok(Seed::from(serde_json::from_value::<Vec<T>>(records)?)),
        Value::Object(mut map) => {
            let last_id = map
                .remove(LAST_ID_KEY)
                .map(serde_json::from_value)
                .transpose()?
                .unwrap_or_default();
            let records = map
                .remove(key)
                .map(serde_json::from_value)
                .transpose()?
                .unwrap_or_default();
            Ok(Seed { last_id, records })
        }
        _ => bail!("expected an array of records or an object with \"{key}\""),
    }
}

fn save<I: Serialize, T: Serialize>(path: &Path, key: &str, seed: &Seed<I, T>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut document = Map::new();
    document.insert(LAST_ID_KEY.to_owned(), serde_json::to_value(&seed.last_id)?);
    document.insert(key.to_owned(), serde_json::to_value(&seed.records)?);
    let json = serde_json::to_string_pretty(&Value::Object(document))?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
