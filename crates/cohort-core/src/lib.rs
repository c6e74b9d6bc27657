//! Core types and computations for cohort analytics over a sales dataset.
//!
//! This crate has no database or file-format dependencies.
//! Storage backends implement [`source::SalesSource`]; everything downstream
//! works on an immutable [`view::Snapshot`].
//!
//! The pipeline has four stages:
//!
//! 1. [`view`] joins sales to customers and derives one [`CohortRecord`] per
//!    customer per order date, labelled with the customer's cohort year.
//! 2. [`segmentation`] splits customers into value tiers by lifetime value.
//! 3. [`cohorts`] summarises first-purchase revenue per cohort year.
//! 4. [`retention`] classifies customers as active or churned.
//!
//! Stages 2–4 only read the snapshot and can run in any order.

pub mod cohorts;
pub mod error;
pub mod fingerprint;
pub mod model;
pub mod percentile;
pub mod report;
pub mod retention;
pub mod segmentation;
pub mod source;
pub mod view;

pub use error::{Error, Result};
pub use model::{CohortRecord, Customer, CustomerKey, Sale};
pub use view::Snapshot;
