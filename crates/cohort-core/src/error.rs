//! Error types for `cohort-core`.

use thiserror::Error;

use crate::model::CustomerKey;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid sale (order {orderkey}, customer {customerkey}): {reason}")]
  InvalidSale {
    customerkey: CustomerKey,
    orderkey:    i64,
    reason:      String,
  },

  #[error("duplicate customer key: {0}")]
  DuplicateCustomer(CustomerKey),

  #[error("percentile must be within [0, 1], got {0}")]
  InvalidPercentile(f64),

  #[error("date out of range: {0}")]
  DateOutOfRange(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
