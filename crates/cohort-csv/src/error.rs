//! Error types for the cohort-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing column {0:?}")]
  MissingColumn(&'static str),

  #[error("invalid row at line {line}: {source}")]
  InvalidRow {
    line:   u64,
    #[source]
    source: csv::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("core error: {0}")]
  Core(#[from] cohort_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
