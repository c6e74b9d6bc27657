//! CSV → domain types.

use std::io;

use cohort_core::model::{Customer, Sale};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

const SALE_COLUMNS: [&str; 6] = [
  "customerkey",
  "orderkey",
  "orderdate",
  "quantity",
  "netprice",
  "exchangerate",
];

const CUSTOMER_COLUMNS: [&str; 5] =
  ["customerkey", "countryfull", "age", "givenname", "surname"];

/// Read sale lines. `orderdate` must be `YYYY-MM-DD`.
pub fn read_sales<R: io::Read>(reader: R) -> Result<Vec<Sale>> {
  read_table(reader, &SALE_COLUMNS)
}

/// Read customers. Name fields are kept verbatim; trimming happens in the
/// view.
pub fn read_customers<R: io::Read>(reader: R) -> Result<Vec<Customer>> {
  read_table(reader, &CUSTOMER_COLUMNS)
}

fn read_table<T, R>(reader: R, required: &[&'static str]) -> Result<Vec<T>>
where
  T: DeserializeOwned,
  R: io::Read,
{
  let mut rdr = csv::ReaderBuilder::new()
    .trim(csv::Trim::Headers)
    .from_reader(reader);

  let headers = rdr.headers()?.clone();
  if let Some(missing) = required
    .iter()
    .find(|col| !headers.iter().any(|h| h.eq_ignore_ascii_case(col)))
  {
    return Err(Error::MissingColumn(*missing));
  }
  // Normalise header case so serde field names match.
  rdr.set_headers(headers.iter().map(str::to_ascii_lowercase).collect());

  let mut rows = Vec::new();
  for result in rdr.deserialize() {
    let row = result.map_err(|source| Error::InvalidRow {
      line: source.position().map_or(0, |p| p.line()),
      source,
    })?;
    rows.push(row);
  }
  Ok(rows)
}
