//! Source rows and the derived cohort record.
//!
//! [`Sale`] and [`Customer`] are read-only inputs supplied by a
//! [`SalesSource`](crate::source::SalesSource). [`CohortRecord`] is computed
//! from them by [`view`](crate::view) and never stored by this crate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifies a customer across both source tables.
pub type CustomerKey = i64;

// ─── Sources ─────────────────────────────────────────────────────────────────

/// One transaction line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
  pub customerkey:  CustomerKey,
  pub orderkey:     i64,
  pub orderdate:    NaiveDate,
  pub quantity:     i64,
  pub netprice:     f64,
  pub exchangerate: f64,
}

impl Sale {
  /// `quantity × netprice × exchangerate`.
  pub fn net_revenue(&self) -> f64 {
    self.quantity as f64 * self.netprice * self.exchangerate
  }

  /// Reject lines that would produce negative or non-finite revenue.
  pub fn validate(&self) -> Result<()> {
    let reason = if self.quantity < 0 {
      Some(format!("negative quantity {}", self.quantity))
    } else if !self.netprice.is_finite() || self.netprice < 0.0 {
      Some(format!("invalid netprice {}", self.netprice))
    } else if !self.exchangerate.is_finite() || self.exchangerate < 0.0 {
      Some(format!("invalid exchangerate {}", self.exchangerate))
    } else {
      None
    };

    match reason {
      Some(reason) => Err(Error::InvalidSale {
        customerkey: self.customerkey,
        orderkey: self.orderkey,
        reason,
      }),
      None => Ok(()),
    }
  }
}

/// Reference data for one customer; `customerkey` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
  pub customerkey: CustomerKey,
  pub countryfull: String,
  pub age:         i32,
  pub givenname:   String,
  pub surname:     String,
}

impl Customer {
  /// Given name and surname, each trimmed, joined by a single space.
  pub fn cleaned_name(&self) -> String {
    format!("{} {}", self.givenname.trim(), self.surname.trim())
  }
}

// ─── Derived ─────────────────────────────────────────────────────────────────

/// Revenue for one customer on one order date, labelled with the customer's
/// cohort.
///
/// `first_purchase_date` and `cohort_year` are the same on every record of a
/// customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRecord {
  pub customerkey:         CustomerKey,
  pub orderdate:           NaiveDate,
  pub net_revenue:         f64,
  /// Number of sale lines aggregated into this record; always at least 1.
  pub num_orders:          u64,
  pub countryfull:         String,
  pub age:                 i32,
  pub cleaned_name:        String,
  pub first_purchase_date: NaiveDate,
  pub cohort_year:         i32,
}

impl CohortRecord {
  pub fn is_first_purchase(&self) -> bool {
    self.orderdate == self.first_purchase_date
  }
}
