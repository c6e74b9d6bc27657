//! Domain types → CSV.
//!
//! Report columns follow the report field names. Missing averages are written
//! as empty fields; segment labels carry their ordinal (`3 - High-Value`) so
//! plots sort them correctly.

use std::io;

use cohort_core::{
  cohorts::CohortSummary,
  model::CohortRecord,
  retention::{CustomerStatus, RetentionReport},
  segmentation::{CustomerSegment, SegmentationReport},
};
use serde::Serialize;

use crate::Result;

fn write_rows<W, T, I>(writer: W, rows: I) -> Result<()>
where
  W: io::Write,
  T: Serialize,
  I: IntoIterator<Item = T>,
{
  let mut wtr = csv::Writer::from_writer(writer);
  for row in rows {
    wtr.serialize(row)?;
  }
  wtr.flush()?;
  Ok(())
}

pub fn write_records<W: io::Write>(writer: W, records: &[CohortRecord]) -> Result<()> {
  write_rows(writer, records)
}

#[derive(Serialize)]
struct SegmentRow {
  customer_segment: String,
  total_ltv:        f64,
  customer_count:   usize,
  avg_ltv:          Option<f64>,
}

pub fn write_segmentation<W: io::Write>(
  writer: W,
  report: &SegmentationReport,
) -> Result<()> {
  write_rows(
    writer,
    report.tiers.iter().map(|t| SegmentRow {
      customer_segment: t.tier.to_string(),
      total_ltv:        t.total_ltv,
      customer_count:   t.customer_count,
      avg_ltv:          t.avg_ltv,
    }),
  )
}

pub fn write_cohorts<W: io::Write>(writer: W, cohorts: &[CohortSummary]) -> Result<()> {
  write_rows(writer, cohorts)
}

pub fn write_retention<W: io::Write>(writer: W, report: &RetentionReport) -> Result<()> {
  write_rows(writer, &report.rows)
}

#[derive(Serialize)]
struct CustomerSegmentRow<'a> {
  customerkey:      i64,
  cleaned_name:     &'a str,
  total_ltv:        f64,
  customer_segment: String,
}

pub fn write_customer_segments<W: io::Write>(
  writer: W,
  segments: &[CustomerSegment],
) -> Result<()> {
  write_rows(
    writer,
    segments.iter().map(|s| CustomerSegmentRow {
      customerkey:      s.customerkey,
      cleaned_name:     &s.cleaned_name,
      total_ltv:        s.total_ltv,
      customer_segment: s.tier.to_string(),
    }),
  )
}

pub fn write_customer_statuses<W: io::Write>(
  writer: W,
  statuses: &[CustomerStatus],
) -> Result<()> {
  write_rows(writer, statuses)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use cohort_core::{
    retention::{Status, StatusSummary},
    segmentation::{Thresholds, TierSummary, ValueTier},
  };

  use super::*;

  fn to_string(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
    let mut buf = Vec::new();
    f(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
  }

  #[test]
  fn segmentation_writes_labels_and_empty_average() {
    let report = SegmentationReport {
      thresholds: Some(Thresholds { ltv_25th: 1.0, ltv_75th: 2.0 }),
      tiers:      vec![
        TierSummary {
          tier:           ValueTier::High,
          total_ltv:      0.0,
          customer_count: 0,
          avg_ltv:        None,
        },
        TierSummary {
          tier:           ValueTier::Mid,
          total_ltv:      3.5,
          customer_count: 2,
          avg_ltv:        Some(1.75),
        },
      ],
    };
    let out = to_string(|w| write_segmentation(w, &report));
    assert_eq!(
      out,
      "customer_segment,total_ltv,customer_count,avg_ltv\n\
       3 - High-Value,0.0,0,\n\
       2 - Mid-Value,3.5,2,1.75\n"
    );
  }

  #[test]
  fn retention_writes_status_names() {
    let report = RetentionReport {
      reference_date: None,
      cutoff:         None,
      rows:           vec![StatusSummary {
        cohort_year:       2022,
        customer_status:   Status::Churned,
        num_customers:     3,
        total_customers:   7,
        status_percentage: 0.43,
      }],
    };
    let out = to_string(|w| write_retention(w, &report));
    assert_eq!(
      out,
      "cohort_year,customer_status,num_customers,total_customers,status_percentage\n\
       2022,Churned,3,7,0.43\n"
    );
  }

  #[test]
  fn records_write_dates_as_iso() {
    let d = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
    let record = CohortRecord {
      customerkey:         1,
      orderdate:           d,
      net_revenue:         25.0,
      num_orders:          2,
      countryfull:         "France".into(),
      age:                 33,
      cleaned_name:        "Jean Dupont".into(),
      first_purchase_date: d,
      cohort_year:         2023,
    };
    let out = to_string(|w| write_records(w, &[record]));
    let mut lines = out.lines();
    assert_eq!(
      lines.next(),
      Some(
        "customerkey,orderdate,net_revenue,num_orders,countryfull,age,\
         cleaned_name,first_purchase_date,cohort_year"
      )
    );
    assert_eq!(
      lines.next(),
      Some("1,2023-01-05,25.0,2,France,33,Jean Dupont,2023-01-05,2023")
    );
  }

  #[test]
  fn customer_segments_carry_ordinal_label() {
    let segments = [CustomerSegment {
      customerkey:  9,
      cleaned_name: "Ana Lima".into(),
      total_ltv:    12.5,
      tier:         ValueTier::Low,
    }];
    let out = to_string(|w| write_customer_segments(w, &segments));
    assert!(out.ends_with("9,Ana Lima,12.5,1 - Low-Value\n"));
  }
}
