//! Runs the selected reporters concurrently over one shared snapshot.
//!
//! The snapshot is immutable, so each reporter gets an `Arc` clone and runs on
//! tokio's blocking pool without any locking.

use std::sync::Arc;

use anyhow::Context as _;
use clap::ValueEnum;
use cohort_core::{
  Snapshot,
  cohorts::{CohortSummary, cohort_report},
  report::ReportHeader,
  retention::{CustomerStatus, RetentionPolicy, RetentionReport, customer_statuses},
  segmentation::{CustomerSegment, SegmentationReport, customer_segments},
};
use serde::Serialize;

/// Which reports to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Selection {
  Segmentation,
  Cohorts,
  Retention,
  #[default]
  All,
}

impl Selection {
  pub fn segmentation(self) -> bool { matches!(self, Self::Segmentation | Self::All) }

  pub fn cohorts(self) -> bool { matches!(self, Self::Cohorts | Self::All) }

  pub fn retention(self) -> bool { matches!(self, Self::Retention | Self::All) }
}

/// The computed reports; unselected ones are `None`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSet {
  pub header:            ReportHeader,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub segmentation:      Option<SegmentationReport>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cohorts:           Option<Vec<CohortSummary>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub retention:         Option<RetentionReport>,
  /// Per-customer tiers; only kept with `--detail`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub customer_segments: Option<Vec<CustomerSegment>>,
  /// Per-customer churn status; only kept with `--detail`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub customer_statuses: Option<Vec<CustomerStatus>>,
}

impl ReportSet {
  /// Number of top-level reports present.
  pub fn len(&self) -> usize {
    [
      self.segmentation.is_some(),
      self.cohorts.is_some(),
      self.retention.is_some(),
      self.customer_segments.is_some(),
      self.customer_statuses.is_some(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

async fn spawn_reporter<T, F>(enabled: bool, f: F) -> anyhow::Result<Option<T>>
where
  T: Send + 'static,
  F: FnOnce() -> cohort_core::Result<T> + Send + 'static,
{
  if !enabled {
    return Ok(None);
  }
  let value = tokio::task::spawn_blocking(f)
    .await
    .context("reporter task failed")??;
  Ok(Some(value))
}

/// Compute the reports chosen by `selection`.
pub async fn run_reports(
  snapshot: Arc<Snapshot>,
  selection: Selection,
  policy: RetentionPolicy,
  detail: bool,
) -> anyhow::Result<ReportSet> {
  let segmentation = spawn_reporter(selection.segmentation(), {
    let snapshot = Arc::clone(&snapshot);
    move || customer_segments(snapshot.records())
  });
  let cohorts = spawn_reporter(selection.cohorts(), {
    let snapshot = Arc::clone(&snapshot);
    move || Ok(cohort_report(snapshot.records()))
  });
  let retention = spawn_reporter(selection.retention(), {
    let snapshot = Arc::clone(&snapshot);
    move || customer_statuses(snapshot.records(), snapshot.reference_date(), &policy)
  });

  let (segmentation, cohorts, retention) =
    tokio::try_join!(segmentation, cohorts, retention)?;

  let (segmentation, customer_segments) = match segmentation {
    Some((thresholds, segments)) => (
      Some(SegmentationReport::from_segments(thresholds, &segments)),
      detail.then_some(segments),
    ),
    None => (None, None),
  };

  let (retention, customer_statuses) = match retention {
    Some((cutoff, statuses)) => (
      Some(RetentionReport::from_statuses(
        snapshot.reference_date(),
        cutoff,
        &statuses,
      )),
      detail.then_some(statuses),
    ),
    None => (None, None),
  };

  tracing::info!(
    segmentation = segmentation.is_some(),
    cohorts = cohorts.is_some(),
    retention = retention.is_some(),
    "reports computed"
  );

  Ok(ReportSet {
    header: ReportHeader::for_snapshot(&snapshot),
    segmentation,
    cohorts,
    retention,
    customer_segments,
    customer_statuses,
  })
}
