//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` text, which sorts and compares correctly
//! under SQLite's text collation and is understood by `strftime`.

use chrono::NaiveDate;
use cohort_core::model::{CohortRecord, Customer, Sale};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `sales` row.
pub struct RawSale {
  pub orderkey:     i64,
  pub customerkey:  i64,
  pub orderdate:    String,
  pub quantity:     i64,
  pub netprice:     f64,
  pub exchangerate: f64,
}

impl RawSale {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      orderkey:     row.get(0)?,
      customerkey:  row.get(1)?,
      orderdate:    row.get(2)?,
      quantity:     row.get(3)?,
      netprice:     row.get(4)?,
      exchangerate: row.get(5)?,
    })
  }

  pub fn into_sale(self) -> Result<Sale> {
    Ok(Sale {
      customerkey:  self.customerkey,
      orderkey:     self.orderkey,
      orderdate:    decode_date(&self.orderdate)?,
      quantity:     self.quantity,
      netprice:     self.netprice,
      exchangerate: self.exchangerate,
    })
  }
}

/// Raw values read from the `cohort_analysis` view.
pub struct RawCohortRecord {
  pub customerkey:         i64,
  pub orderdate:           String,
  pub net_revenue:         f64,
  pub num_orders:          i64,
  pub countryfull:         String,
  pub age:                 i32,
  pub cleaned_name:        String,
  pub first_purchase_date: String,
  pub cohort_year:         i32,
}

impl RawCohortRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      customerkey:         row.get(0)?,
      orderdate:           row.get(1)?,
      net_revenue:         row.get(2)?,
      num_orders:          row.get(3)?,
      countryfull:         row.get(4)?,
      age:                 row.get(5)?,
      cleaned_name:        row.get(6)?,
      first_purchase_date: row.get(7)?,
      cohort_year:         row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<CohortRecord> {
    Ok(CohortRecord {
      customerkey:         self.customerkey,
      orderdate:           decode_date(&self.orderdate)?,
      net_revenue:         self.net_revenue,
      num_orders:          self.num_orders.max(0) as u64,
      countryfull:         self.countryfull,
      age:                 self.age,
      cleaned_name:        self.cleaned_name,
      first_purchase_date: decode_date(&self.first_purchase_date)?,
      cohort_year:         self.cohort_year,
    })
  }
}

pub fn customer_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Customer> {
  Ok(Customer {
    customerkey: row.get(0)?,
    countryfull: row.get(1)?,
    age:         row.get(2)?,
    givenname:   row.get(3)?,
    surname:     row.get(4)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn date_round_trips_through_text() {
    let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(encode_date(d), "2024-02-29");
    assert_eq!(decode_date("2024-02-29").unwrap(), d);
  }

  #[test]
  fn malformed_date_is_an_error() {
    assert!(matches!(decode_date("2024-13-01"), Err(Error::DateParse(_))));
    assert!(decode_date("05/01/2023").is_err());
  }
}
