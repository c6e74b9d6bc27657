//! Revenue per cohort, measured on each customer's first purchase date only.
//!
//! This is acquisition value, not lifetime value: later repeat purchases are
//! excluded.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{CohortRecord, CustomerKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
  pub cohort_year:      i32,
  pub total_revenue:    f64,
  pub total_customers:  usize,
  /// `None` when the cohort has no customers.
  pub customer_revenue: Option<f64>,
}

/// One summary per cohort year, ascending.
pub fn cohort_report(records: &[CohortRecord]) -> Vec<CohortSummary> {
  let mut years: BTreeMap<i32, (f64, BTreeSet<CustomerKey>)> = BTreeMap::new();
  for r in records.iter().filter(|r| r.is_first_purchase()) {
    let (revenue, customers) = years.entry(r.cohort_year).or_default();
    *revenue += r.net_revenue;
    customers.insert(r.customerkey);
  }

  years
    .into_iter()
    .map(|(cohort_year, (total_revenue, customers))| {
      let total_customers = customers.len();
      CohortSummary {
        cohort_year,
        total_revenue,
        total_customers,
        customer_revenue: (total_customers > 0)
          .then(|| total_revenue / total_customers as f64),
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::view::{
    Snapshot,
    tests::{customer, date, sale},
  };

  fn snapshot() -> Snapshot {
    let sales = vec![
      // 2022 cohort: customer 1 first buys 2022-05-01, then again later.
      sale(1, 1, date(2022, 5, 1), 2, 50.0),
      sale(1, 2, date(2022, 5, 1), 1, 20.0),
      sale(1, 3, date(2023, 8, 1), 10, 100.0),
      // 2022 cohort: customer 2.
      sale(2, 4, date(2022, 11, 3), 1, 30.0),
      // 2023 cohort: customer 3.
      sale(3, 5, date(2023, 2, 14), 4, 25.0),
    ];
    Snapshot::build(sales, vec![customer(1), customer(2), customer(3)]).unwrap()
  }

  #[test]
  fn only_first_purchase_revenue_counts() {
    let report = cohort_report(snapshot().records());
    assert_eq!(report.len(), 2);

    let y2022 = &report[0];
    assert_eq!(y2022.cohort_year, 2022);
    assert_eq!(y2022.total_revenue, 150.0);
    assert_eq!(y2022.total_customers, 2);
    assert_eq!(y2022.customer_revenue, Some(75.0));

    let y2023 = &report[1];
    assert_eq!(y2023.cohort_year, 2023);
    assert_eq!(y2023.total_revenue, 100.0);
    assert_eq!(y2023.total_customers, 1);
  }

  #[test]
  fn customers_across_cohorts_match_distinct_customers() {
    let snapshot = snapshot();
    let report = cohort_report(snapshot.records());
    let total: usize = report.iter().map(|c| c.total_customers).sum();
    let distinct: BTreeSet<_> =
      snapshot.records().iter().map(|r| r.customerkey).collect();
    assert_eq!(total, distinct.len());
  }

  #[test]
  fn empty_view_has_no_cohorts() {
    assert!(cohort_report(&[]).is_empty());
  }

  #[test]
  fn cohorts_are_ascending() {
    let sales = vec![
      sale(1, 1, date(2024, 1, 1), 1, 1.0),
      sale(2, 2, date(2019, 1, 1), 1, 1.0),
      sale(3, 3, NaiveDate::from_ymd_opt(2021, 6, 6).unwrap(), 1, 1.0),
    ];
    let snapshot =
      Snapshot::build(sales, vec![customer(1), customer(2), customer(3)]).unwrap();
    let years: Vec<_> =
      cohort_report(snapshot.records()).iter().map(|c| c.cohort_year).collect();
    assert_eq!(years, vec![2019, 2021, 2024]);
  }
}
