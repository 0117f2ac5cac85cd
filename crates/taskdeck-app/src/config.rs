use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::latency::Latency;

const CONFIG_DIR: &str = "taskdeck";
const CONFIG_FILE: &str = "config.toml";
const TASKS_FILE: &str = "tasks.json";
const CATEGORIES_FILE: &str = "categories.json";

const OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
}

impl AppConfig {
    /// Load from an explicit path, or from the user config directory when none is given.
    ///
    /// An explicit path must exist; the default location may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            return Self::from_path(path);
        }
        match default_config_path() {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file, falling back to defaults when it is missing.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.calendar.utc_offset().map(|_| ())
    }

    /// Path of the task seed file.
    pub fn tasks_path(&self) -> Result<PathBuf> {
        self.store.tasks.clone().map_or_else(|| data_file(TASKS_FILE), Ok)
    }

    /// Path of the category seed file.
    pub fn categories_path(&self) -> Result<PathBuf> {
        self.store
            .categories
            .clone()
            .map_or_else(|| data_file(CATEGORIES_FILE), Ok)
    }

    /// Configured service latency.
    pub const fn latency(&self) -> Latency {
        Latency::from_millis(self.latency.millis)
    }
}

/// Location of the user-level configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

fn data_file(name: &str) -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(CONFIG_DIR).join(name))
        .ok_or_else(|| anyhow!("failed to resolve data directory; set [store] paths explicitly"))
}

/// Where seed files live.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub tasks: Option<PathBuf>,
    #[serde(default)]
    pub categories: Option<PathBuf>,
}

/// Day-boundary settings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CalendarConfig {
    #[serde(default)]
    utc_offset: Option<String>,
}

impl CalendarConfig {
    /// Calendar using the given offset string.
    pub fn with_offset(offset: impl Into<String>) -> Self {
        Self {
            utc_offset: Some(offset.into()),
        }
    }

    /// Offset used to decide which calendar day "now" falls on (UTC when unset).
    pub fn utc_offset(&self) -> Result<UtcOffset> {
        self.utc_offset.as_deref().map_or(Ok(UtcOffset::UTC), parse_offset)
    }
}

/// Parse `Z`, `UTC`, or `±HH:MM`.
pub fn parse_offset(raw: &str) -> Result<UtcOffset> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(trimmed, OFFSET_FORMAT)
        .with_context(|| format!("invalid utc_offset '{raw}', expected ±HH:MM"))
}

/// Artificial delay settings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LatencyConfig {
    #[serde(default)]
    pub millis: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::tempdir;
    use time::macros::offset;

    #[test]
    fn missing_config_returns_defaults() -> Result<()> {
        let dir = tempdir()?;
        let cfg = AppConfig::from_path(dir.path().join(CONFIG_FILE))?;
        assert_eq!(cfg.calendar.utc_offset()?, UtcOffset::UTC);
        assert_eq!(cfg.latency(), Latency::None);
        assert!(cfg.store.tasks.is_none());
        Ok(())
    }

    #[test]
    fn load_config_with_all_sections() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        let mut file = fs::File::create(&path)?;
        writeln!(
            file,
            "[store]\ntasks = \"/tmp/t.json\"\ncategories = \"/tmp/c.json\"\n\n[calendar]\nutc_offset = \"+09:00\"\n\n[latency]\nmillis = 200"
        )?;

        let cfg = AppConfig::from_path(&path)?;
        assert_eq!(cfg.tasks_path()?, PathBuf::from("/tmp/t.json"));
        assert_eq!(cfg.categories_path()?, PathBuf::from("/tmp/c.json"));
        assert_eq!(cfg.calendar.utc_offset()?, offset!(+9));
        assert_eq!(cfg.latency(), Latency::Fixed(Duration::from_millis(200)));
        Ok(())
    }

    #[test]
    fn malformed_offset_is_rejected() {
        let Err(err) = AppConfig::from_toml_str("[calendar]\nutc_offset = \"nine\"") else {
            panic!("malformed offset should error");
        };
        assert!(err.to_string().contains("invalid utc_offset"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        assert!(AppConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
        Ok(())
    }

    #[test]
    fn offset_parser_accepts_aliases_and_signs() -> Result<()> {
        assert_eq!(parse_offset("Z")?, UtcOffset::UTC);
        assert_eq!(parse_offset("utc")?, UtcOffset::UTC);
        assert_eq!(parse_offset("-05:30")?, offset!(-5:30));
        assert_eq!(CalendarConfig::with_offset("+01:00").utc_offset()?, offset!(+1));
        Ok(())
    }
}
