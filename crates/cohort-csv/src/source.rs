//! [`CsvSource`]: a pair of CSV files as a [`SalesSource`].

use std::path::PathBuf;

use cohort_core::{
  model::{Customer, Sale},
  source::SalesSource,
};

use crate::{Result, read_customers, read_sales};

/// Sales and customer tables exported as two CSV files.
#[derive(Debug, Clone)]
pub struct CsvSource {
  pub sales:     PathBuf,
  pub customers: PathBuf,
}

impl CsvSource {
  pub fn new(sales: impl Into<PathBuf>, customers: impl Into<PathBuf>) -> Self {
    Self { sales: sales.into(), customers: customers.into() }
  }
}

impl SalesSource for CsvSource {
  type Error = crate::Error;

  async fn load_sales(&self) -> Result<Vec<Sale>> {
    let bytes = tokio::fs::read(&self.sales).await?;
    let sales = read_sales(bytes.as_slice())?;
    tracing::debug!(path = %self.sales.display(), rows = sales.len(), "read sales csv");
    Ok(sales)
  }

  async fn load_customers(&self) -> Result<Vec<Customer>> {
    let bytes = tokio::fs::read(&self.customers).await?;
    let customers = read_customers(bytes.as_slice())?;
    tracing::debug!(
      path = %self.customers.display(),
      rows = customers.len(),
      "read customers csv"
    );
    Ok(customers)
  }
}
