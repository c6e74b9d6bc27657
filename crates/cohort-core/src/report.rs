//! The three reports computed together over one snapshot.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  Result,
  cohorts::{CohortSummary, cohort_report},
  fingerprint::fingerprint,
  retention::{RetentionPolicy, RetentionReport, retention_report},
  segmentation::{SegmentationReport, segmentation_report},
  view::{Snapshot, ViewStats},
};

/// Identifies the data a set of reports was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportHeader {
  pub fingerprint:    String,
  pub reference_date: Option<NaiveDate>,
  pub stats:          ViewStats,
}

impl ReportHeader {
  pub fn for_snapshot(snapshot: &Snapshot) -> Self {
    Self {
      fingerprint:    fingerprint(snapshot),
      reference_date: snapshot.reference_date(),
      stats:          snapshot.stats(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reports {
  pub header:       ReportHeader,
  pub segmentation: SegmentationReport,
  pub cohorts:      Vec<CohortSummary>,
  pub retention:    RetentionReport,
}

impl Reports {
  /// Run every reporter sequentially.
  pub fn compute(snapshot: &Snapshot, policy: &RetentionPolicy) -> Result<Self> {
    let records = snapshot.records();
    Ok(Self {
      header:       ReportHeader::for_snapshot(snapshot),
      segmentation: segmentation_report(records)?,
      cohorts:      cohort_report(records),
      retention:    retention_report(records, snapshot.reference_date(), policy)?,
    })
  }
}
