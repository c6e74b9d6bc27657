//! Content fingerprint for a [`Snapshot`].
//!
//! The fingerprint is a SHA-256 hash over the source rows, each sorted by its
//! key columns first. The same dataset loaded in any row order hashes the
//! same, so a rendered report can be traced back to the data it came from.

use sha2::{Digest, Sha256};

use crate::{
  model::{Customer, Sale},
  view::Snapshot,
};

/// Compute the fingerprint of `snapshot` as lowercase hex.
pub fn fingerprint(snapshot: &Snapshot) -> String {
  fingerprint_sources(snapshot.sales(), snapshot.customers())
}

/// Compute the fingerprint directly from source rows.
pub fn fingerprint_sources(sales: &[Sale], customers: &[Customer]) -> String {
  let mut sales: Vec<&Sale> = sales.iter().collect();
  sales.sort_by(|a, b| {
    (a.customerkey, a.orderdate, a.orderkey, a.quantity)
      .cmp(&(b.customerkey, b.orderdate, b.orderkey, b.quantity))
      .then(a.netprice.total_cmp(&b.netprice))
      .then(a.exchangerate.total_cmp(&b.exchangerate))
  });

  let mut customers: Vec<&Customer> = customers.iter().collect();
  customers.sort_by_key(|c| c.customerkey);

  let mut hasher = Sha256::new();
  hasher.update((sales.len() as u64).to_le_bytes());
  for s in sales {
    hasher.update(s.customerkey.to_le_bytes());
    hasher.update(s.orderkey.to_le_bytes());
    hasher.update(s.orderdate.to_string().as_bytes());
    hasher.update(s.quantity.to_le_bytes());
    hasher.update(s.netprice.to_bits().to_le_bytes());
    hasher.update(s.exchangerate.to_bits().to_le_bytes());
  }

  hasher.update((customers.len() as u64).to_le_bytes());
  for c in customers {
    hasher.update(c.customerkey.to_le_bytes());
    hasher.update(c.age.to_le_bytes());
    for text in [&c.countryfull, &c.givenname, &c.surname] {
      hasher.update((text.len() as u64).to_le_bytes());
      hasher.update(text.as_bytes());
    }
  }

  hex::encode(hasher.finalize())
}
