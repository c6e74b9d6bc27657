//! CSV codec for cohort analytics.
//!
//! Reads the sales and customer tables from CSV exports and writes the view
//! and the reports back out as CSV. Columns are addressed by header name, so
//! exports with extra columns load unchanged.
//!
//! # Quick start
//!
//! ```no_run
//! use cohort_csv::read_sales;
//!
//! let input = "customerkey,orderkey,orderdate,quantity,netprice,exchangerate\n\
//!              1,100,2023-01-05,2,10.0,1.0\n";
//! let sales = read_sales(input.as_bytes()).unwrap();
//! println!("{} sales", sales.len());
//! ```

pub mod error;
mod parse;
mod serialize;
mod source;

pub use error::{Error, Result};
pub use parse::{read_customers, read_sales};
pub use serialize::{
  write_cohorts, write_customer_segments, write_customer_statuses, write_records,
  write_retention, write_segmentation,
};
pub use source::CsvSource;
