//! The revenue view: one [`CohortRecord`] per customer per order date.
//!
//! Sales are inner-joined to customers on `customerkey`: sales whose customer
//! is unknown and customers without sales are dropped without error. The
//! dropped counts are kept in [`ViewStats`] and logged at debug level.

use std::collections::{BTreeMap, HashMap, hash_map::Entry};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{
  Error, Result,
  model::{CohortRecord, Customer, CustomerKey, Sale},
};

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Row counts observed while building the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewStats {
  pub sales:                   usize,
  pub customers:               usize,
  pub records:                 usize,
  /// Sales whose `customerkey` has no customer row.
  pub orphan_sales:            usize,
  /// Customers with no sale at all.
  pub customers_without_sales: usize,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct DayTotal {
  net_revenue: f64,
  num_orders:  u64,
}

/// Build the cohort records for `sales` joined to `customers`.
///
/// Records come out ordered by `(customerkey, orderdate)`.
pub fn build_records(
  sales: &[Sale],
  customers: &[Customer],
) -> Result<(Vec<CohortRecord>, ViewStats)> {
  let mut by_key: HashMap<CustomerKey, &Customer> =
    HashMap::with_capacity(customers.len());
  for customer in customers {
    match by_key.entry(customer.customerkey) {
      Entry::Occupied(_) => {
        return Err(Error::DuplicateCustomer(customer.customerkey));
      }
      Entry::Vacant(slot) => {
        slot.insert(customer);
      }
    }
  }

  let mut days: BTreeMap<(CustomerKey, NaiveDate), DayTotal> = BTreeMap::new();
  let mut orphan_sales = 0;
  for sale in sales {
    sale.validate()?;
    if !by_key.contains_key(&sale.customerkey) {
      orphan_sales += 1;
      continue;
    }
    let day = days.entry((sale.customerkey, sale.orderdate)).or_default();
    day.net_revenue += sale.net_revenue();
    day.num_orders += 1;
  }

  // Keys are ordered, so the first date seen for a customer is its minimum.
  let mut first_purchase: BTreeMap<CustomerKey, NaiveDate> = BTreeMap::new();
  for &(key, date) in days.keys() {
    first_purchase.entry(key).or_insert(date);
  }

  let mut records = Vec::with_capacity(days.len());
  for ((key, orderdate), day) in days {
    let customer = by_key[&key];
    let first_purchase_date = first_purchase[&key];
    records.push(CohortRecord {
      customerkey: key,
      orderdate,
      net_revenue: day.net_revenue,
      num_orders: day.num_orders,
      countryfull: customer.countryfull.clone(),
      age: customer.age,
      cleaned_name: customer.cleaned_name(),
      first_purchase_date,
      cohort_year: first_purchase_date.year(),
    });
  }

  let stats = ViewStats {
    sales: sales.len(),
    customers: customers.len(),
    records: records.len(),
    orphan_sales,
    customers_without_sales: customers.len() - first_purchase.len(),
  };

  Ok((records, stats))
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The materialised view together with the sources it was built from.
///
/// Immutable once built; reporters borrow it and may run concurrently.
#[derive(Debug, Clone)]
pub struct Snapshot {
  sales:          Vec<Sale>,
  customers:      Vec<Customer>,
  records:        Vec<CohortRecord>,
  reference_date: Option<NaiveDate>,
  stats:          ViewStats,
}

impl Snapshot {
  /// Validate the sources and build the view.
  pub fn build(sales: Vec<Sale>, customers: Vec<Customer>) -> Result<Self> {
    let (records, stats) = build_records(&sales, &customers)?;
    // Taken over every sale, including those dropped by the join.
    let reference_date = sales.iter().map(|s| s.orderdate).max();

    tracing::debug!(
      sales = stats.sales,
      customers = stats.customers,
      records = stats.records,
      orphan_sales = stats.orphan_sales,
      customers_without_sales = stats.customers_without_sales,
      "built cohort view"
    );

    Ok(Self { sales, customers, records, reference_date, stats })
  }

  pub fn sales(&self) -> &[Sale] { &self.sales }

  pub fn customers(&self) -> &[Customer] { &self.customers }

  pub fn records(&self) -> &[CohortRecord] { &self.records }

  /// Latest order date across all sales; `None` for an empty dataset.
  pub fn reference_date(&self) -> Option<NaiveDate> { self.reference_date }

  pub fn stats(&self) -> ViewStats { self.stats }
}
