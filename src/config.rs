// Presentation defaults loaded from YAML

use crate::filter::{SortSpec, StatusFilter};
use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// File name looked up inside the store directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Optional user configuration
///
/// ```yaml
/// filter: pending
/// sort:
///   column: task
///   order: desc
/// date_format: "%d %b %Y, %H:%M"
/// color: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Status filter used by `list` when none is given
    pub filter: StatusFilter,
    /// Sort used by `list` when none is given
    pub sort: SortSpec,
    /// chrono strftime pattern for the due column
    pub date_format: String,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter: StatusFilter::All,
            sort: SortSpec::default(),
            date_format: "%d %b %Y, %H:%M".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;

        let config = Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))?;

        info!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.date_format.trim().is_empty() {
            return Err(eyre!("date_format cannot be empty"));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(eyre!("Invalid date_format: {}", self.date_format));
        }

        // Due dates carry no offset, so %z, %Z and friends cannot be rendered
        let mut sample = String::new();
        if write!(sample, "{}", NaiveDateTime::default().format(&self.date_format)).is_err() {
            return Err(eyre!("date_format needs a time zone: {}", self.date_format));
        }
        Ok(())
    }
}
