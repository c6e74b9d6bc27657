//! SQLite backend for the cohort analytics sources.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Besides the two source tables, the
//! schema defines a `cohort_analysis` view for tools that query the database
//! directly.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
