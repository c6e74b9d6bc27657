//! The `SalesSource` trait.
//!
//! Implemented by backends that can supply the two source tables (e.g.
//! `cohort-store-sqlite`, `cohort-csv`). The reporters never see a source;
//! they work on the [`Snapshot`] built from it.

use std::future::Future;

use crate::{
  Error,
  model::{Customer, Sale},
  view::Snapshot,
};

/// Abstraction over a read-only supplier of sales and customers.
///
/// All methods return `Send` futures so sources can be loaded from
/// multi-threaded async runtimes.
pub trait SalesSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every sale line, in any order.
  fn load_sales(
    &self,
  ) -> impl Future<Output = Result<Vec<Sale>, Self::Error>> + Send + '_;

  /// Every customer, in any order.
  fn load_customers(
    &self,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + '_;
}

/// Load both tables from `source` and build the view.
pub async fn load_snapshot<S>(source: &S) -> Result<Snapshot, S::Error>
where
  S: SalesSource,
  S::Error: From<Error>,
{
  let sales = source.load_sales().await?;
  let customers = source.load_customers().await?;
  tracing::info!(sales = sales.len(), customers = customers.len(), "loaded sources");
  Ok(Snapshot::build(sales, customers)?)
}
