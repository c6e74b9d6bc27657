//! Customer segmentation by lifetime value.
//!
//! Each customer's lifetime value (LTV) is the sum of net revenue over all of
//! their records. Customers are split into three tiers by the interpolated
//! 25th and 75th percentiles of the LTV distribution.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  model::{CohortRecord, CustomerKey},
  percentile::percentile_cont,
};

pub const LOW_PERCENTILE: f64 = 0.25;
pub const HIGH_PERCENTILE: f64 = 0.75;

// ─── Tiers ───────────────────────────────────────────────────────────────────

/// Value tier; ordered `Low < Mid < High`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ValueTier {
  #[serde(rename = "Low-Value")]
  Low,
  #[serde(rename = "Mid-Value")]
  Mid,
  #[serde(rename = "High-Value")]
  High,
}

impl ValueTier {
  /// Report order: highest tier first.
  pub const DESCENDING: [ValueTier; 3] = [Self::High, Self::Mid, Self::Low];

  pub fn label(self) -> &'static str {
    match self {
      Self::Low => "Low-Value",
      Self::Mid => "Mid-Value",
      Self::High => "High-Value",
    }
  }

  pub fn ordinal(self) -> u8 {
    match self {
      Self::Low => 1,
      Self::Mid => 2,
      Self::High => 3,
    }
  }
}

impl fmt::Display for ValueTier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} - {}", self.ordinal(), self.label())
  }
}

/// The tier boundaries computed over the customer population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
  pub ltv_25th: f64,
  pub ltv_75th: f64,
}

impl Thresholds {
  /// Low below the 25th percentile, Mid up to and including the 75th.
  pub fn classify(&self, ltv: f64) -> ValueTier {
    if ltv < self.ltv_25th {
      ValueTier::Low
    } else if ltv <= self.ltv_75th {
      ValueTier::Mid
    } else {
      ValueTier::High
    }
  }
}

// ─── Per-customer ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegment {
  pub customerkey:  CustomerKey,
  pub cleaned_name: String,
  pub total_ltv:    f64,
  pub tier:         ValueTier,
}

/// Lifetime value per customer, ordered by `customerkey`.
pub fn lifetime_values(records: &[CohortRecord]) -> Vec<(CustomerKey, String, f64)> {
  let mut totals: BTreeMap<CustomerKey, (&str, f64)> = BTreeMap::new();
  for r in records {
    let entry = totals
      .entry(r.customerkey)
      .or_insert((r.cleaned_name.as_str(), 0.0));
    entry.1 += r.net_revenue;
  }
  totals
    .into_iter()
    .map(|(key, (name, ltv))| (key, name.to_owned(), ltv))
    .collect()
}

/// Compute the thresholds and assign every customer a tier.
///
/// Thresholds are `None` when there are no customers.
pub fn customer_segments(
  records: &[CohortRecord],
) -> Result<(Option<Thresholds>, Vec<CustomerSegment>)> {
  let ltvs = lifetime_values(records);
  let values: Vec<f64> = ltvs.iter().map(|(_, _, ltv)| *ltv).collect();

  let thresholds = match (
    percentile_cont(&values, LOW_PERCENTILE)?,
    percentile_cont(&values, HIGH_PERCENTILE)?,
  ) {
    (Some(ltv_25th), Some(ltv_75th)) => Thresholds { ltv_25th, ltv_75th },
    _ => return Ok((None, Vec::new())),
  };

  let segments = ltvs
    .into_iter()
    .map(|(customerkey, cleaned_name, total_ltv)| CustomerSegment {
      customerkey,
      cleaned_name,
      total_ltv,
      tier: thresholds.classify(total_ltv),
    })
    .collect();

  Ok((Some(thresholds), segments))
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
  pub tier:           ValueTier,
  pub total_ltv:      f64,
  pub customer_count: usize,
  /// `None` when the tier has no customers.
  pub avg_ltv:        Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationReport {
  pub thresholds: Option<Thresholds>,
  /// Always three entries, High first.
  pub tiers:      Vec<TierSummary>,
}

impl SegmentationReport {
  pub fn from_segments(
    thresholds: Option<Thresholds>,
    segments: &[CustomerSegment],
  ) -> Self {
    let tiers = ValueTier::DESCENDING
      .iter()
      .map(|&tier| {
        let (total_ltv, customer_count) = segments
          .iter()
          .filter(|s| s.tier == tier)
          .fold((0.0, 0), |(sum, n), s| (sum + s.total_ltv, n + 1));
        TierSummary {
          tier,
          total_ltv,
          customer_count,
          avg_ltv: (customer_count > 0).then(|| total_ltv / customer_count as f64),
        }
      })
      .collect();

    Self { thresholds, tiers }
  }
}

pub fn segmentation_report(records: &[CohortRecord]) -> Result<SegmentationReport> {
  let (thresholds, segments) = customer_segments(records)?;
  Ok(SegmentationReport::from_segments(thresholds, &segments))
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn record(key: CustomerKey, day: u32, revenue: f64) -> CohortRecord {
    let first = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    CohortRecord {
      customerkey:         key,
      orderdate:           NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
      net_revenue:         revenue,
      num_orders:          1,
      countryfull:         "Canada".into(),
      age:                 50,
      cleaned_name:        format!("Customer {key}"),
      first_purchase_date: first,
      cohort_year:         2023,
    }
  }

  /// Five customers with LTV 10, 20, 30, 40, 50 → p25 = 20, p75 = 40.
  fn five_customers() -> Vec<CohortRecord> {
    vec![
      record(1, 1, 10.0),
      record(2, 1, 5.0),
      record(2, 2, 15.0),
      record(3, 1, 30.0),
      record(4, 1, 40.0),
      record(5, 1, 50.0),
    ]
  }

  #[test]
  fn lifetime_value_sums_all_records() {
    let ltvs = lifetime_values(&five_customers());
    assert_eq!(ltvs.len(), 5);
    assert_eq!(ltvs[1], (2, "Customer 2".to_owned(), 20.0));
  }

  #[test]
  fn boundaries_are_inclusive_for_mid_value() {
    let (thresholds, segments) = customer_segments(&five_customers()).unwrap();
    let thresholds = thresholds.unwrap();
    assert_eq!(thresholds.ltv_25th, 20.0);
    assert_eq!(thresholds.ltv_75th, 40.0);

    let tier_of = |key| segments.iter().find(|s| s.customerkey == key).unwrap().tier;
    assert_eq!(tier_of(1), ValueTier::Low);
    // Exactly at the 25th percentile.
    assert_eq!(tier_of(2), ValueTier::Mid);
    assert_eq!(tier_of(3), ValueTier::Mid);
    // Exactly at the 75th percentile.
    assert_eq!(tier_of(4), ValueTier::Mid);
    assert_eq!(tier_of(5), ValueTier::High);
  }

  #[test]
  fn report_lists_three_tiers_high_first() {
    let report = segmentation_report(&five_customers()).unwrap();
    let order: Vec<_> = report.tiers.iter().map(|t| t.tier).collect();
    assert_eq!(order, vec![ValueTier::High, ValueTier::Mid, ValueTier::Low]);

    let mid = &report.tiers[1];
    assert_eq!(mid.customer_count, 3);
    assert_eq!(mid.total_ltv, 90.0);
    assert_eq!(mid.avg_ltv, Some(30.0));
  }

  #[test]
  fn tier_totals_add_up() {
    let records = five_customers();
    let report = segmentation_report(&records).unwrap();

    let count: usize = report.tiers.iter().map(|t| t.customer_count).sum();
    let total: f64 = report.tiers.iter().map(|t| t.total_ltv).sum();
    let revenue: f64 = records.iter().map(|r| r.net_revenue).sum();
    assert_eq!(count, 5);
    assert!((total - revenue).abs() < 1e-9);
  }

  #[test]
  fn empty_tier_has_no_average() {
    // A single customer sits on both thresholds and is Mid.
    let report = segmentation_report(&[record(1, 1, 12.0)]).unwrap();
    assert_eq!(report.tiers[0].customer_count, 0);
    assert_eq!(report.tiers[0].avg_ltv, None);
    assert_eq!(report.tiers[1].customer_count, 1);
    assert_eq!(report.tiers[2].avg_ltv, None);
  }

  #[test]
  fn no_customers_yields_empty_tiers() {
    let report = segmentation_report(&[]).unwrap();
    assert!(report.thresholds.is_none());
    assert_eq!(report.tiers.len(), 3);
    assert!(report.tiers.iter().all(|t| t.customer_count == 0));
  }

  #[test]
  fn tier_display_carries_ordinal() {
    assert_eq!(ValueTier::High.to_string(), "3 - High-Value");
    assert_eq!(ValueTier::Low.to_string(), "1 - Low-Value");
    assert!(ValueTier::High > ValueTier::Mid);
  }

  #[test]
  fn tier_serializes_as_label() {
    let json = serde_json::to_string(&ValueTier::Mid).unwrap();
    assert_eq!(json, "\"Mid-Value\"");
  }
}
