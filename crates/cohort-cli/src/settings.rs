//! Runtime settings, layered from an optional TOML file and `COHORT_*`
//! environment variables. Command-line flags override both.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use cohort_core::retention::DEFAULT_INACTIVITY_MONTHS;
use serde::Deserialize;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
  #[default]
  Table,
  Json,
  Csv,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database holding the source tables.
  #[serde(default = "default_database")]
  pub database:          PathBuf,
  /// Months without a purchase before a customer counts as churned.
  #[serde(default = "default_inactivity_months")]
  pub inactivity_months: u32,
  #[serde(default)]
  pub format:            Format,
}

fn default_database() -> PathBuf { PathBuf::from("cohort.db") }

fn default_inactivity_months() -> u32 { DEFAULT_INACTIVITY_MONTHS }

impl Settings {
  /// Read `path` if it exists, then apply `COHORT_*` environment overrides.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("COHORT").try_parsing(true))
      .build()?
      .try_deserialize()
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
