//! Retention and churn by cohort.
//!
//! A customer is churned when their last purchase falls strictly before the
//! cutoff: the dataset's latest order date minus the inactivity window.
//! Customers whose first purchase is not before the cutoff have not had the
//! chance to churn and are left out.

use std::{collections::BTreeMap, fmt};

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  model::{CohortRecord, CustomerKey},
};

pub const DEFAULT_INACTIVITY_MONTHS: u32 = 6;

// ─── Policy ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
  pub inactivity_months: u32,
}

impl Default for RetentionPolicy {
  fn default() -> Self {
    Self { inactivity_months: DEFAULT_INACTIVITY_MONTHS }
  }
}

impl RetentionPolicy {
  /// `reference` minus the inactivity window, clamped to the end of month.
  pub fn cutoff(&self, reference: NaiveDate) -> Result<NaiveDate> {
    reference
      .checked_sub_months(Months::new(self.inactivity_months))
      .ok_or_else(|| {
        Error::DateOutOfRange(format!(
          "{reference} minus {} months",
          self.inactivity_months
        ))
      })
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Status {
  Active,
  Churned,
}

impl Status {
  pub fn label(self) -> &'static str {
    match self {
      Self::Active => "Active",
      Self::Churned => "Churned",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerStatus {
  pub customerkey:         CustomerKey,
  pub cleaned_name:        String,
  pub cohort_year:         i32,
  pub first_purchase_date: NaiveDate,
  pub last_purchase_date:  NaiveDate,
  pub status:              Status,
}

/// Classify every customer eligible for the retention report.
///
/// Returns the cutoff alongside the statuses, ordered by `customerkey`. Both
/// are empty when there is no reference date.
pub fn customer_statuses(
  records: &[CohortRecord],
  reference_date: Option<NaiveDate>,
  policy: &RetentionPolicy,
) -> Result<(Option<NaiveDate>, Vec<CustomerStatus>)> {
  let Some(reference) = reference_date else {
    return Ok((None, Vec::new()));
  };
  let cutoff = policy.cutoff(reference)?;

  let mut last: BTreeMap<CustomerKey, &CohortRecord> = BTreeMap::new();
  for r in records {
    last
      .entry(r.customerkey)
      .and_modify(|seen| {
        if r.orderdate > seen.orderdate {
          *seen = r;
        }
      })
      .or_insert(r);
  }

  let statuses = last
    .into_values()
    .filter(|r| r.first_purchase_date < cutoff)
    .map(|r| CustomerStatus {
      customerkey:         r.customerkey,
      cleaned_name:        r.cleaned_name.clone(),
      cohort_year:         r.cohort_year,
      first_purchase_date: r.first_purchase_date,
      last_purchase_date:  r.orderdate,
      status:              if r.orderdate < cutoff {
        Status::Churned
      } else {
        Status::Active
      },
    })
    .collect();

  Ok((Some(cutoff), statuses))
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
  pub cohort_year:       i32,
  pub customer_status:   Status,
  pub num_customers:     usize,
  /// Customers in the cohort across both statuses.
  pub total_customers:   usize,
  /// `num_customers / total_customers`, rounded to two decimals.
  pub status_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionReport {
  pub reference_date: Option<NaiveDate>,
  pub cutoff:         Option<NaiveDate>,
  /// Ascending by cohort year, Active before Churned.
  pub rows:           Vec<StatusSummary>,
}

impl RetentionReport {
  pub fn from_statuses(
    reference_date: Option<NaiveDate>,
    cutoff: Option<NaiveDate>,
    statuses: &[CustomerStatus],
  ) -> Self {
    let mut counts: BTreeMap<(i32, Status), usize> = BTreeMap::new();
    let mut totals: BTreeMap<i32, usize> = BTreeMap::new();
    for s in statuses {
      *counts.entry((s.cohort_year, s.status)).or_default() += 1;
      *totals.entry(s.cohort_year).or_default() += 1;
    }

    let rows = counts
      .into_iter()
      .map(|((cohort_year, customer_status), num_customers)| {
        let total_customers = totals[&cohort_year];
        StatusSummary {
          cohort_year,
          customer_status,
          num_customers,
          total_customers,
          status_percentage: round2(num_customers as f64 / total_customers as f64),
        }
      })
      .collect();

    Self { reference_date, cutoff, rows }
  }
}

pub fn retention_report(
  records: &[CohortRecord],
  reference_date: Option<NaiveDate>,
  policy: &RetentionPolicy,
) -> Result<RetentionReport> {
  let (cutoff, statuses) = customer_statuses(records, reference_date, policy)?;
  Ok(RetentionReport::from_statuses(reference_date, cutoff, &statuses))
}

fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }
