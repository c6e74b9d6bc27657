//! Output rendering: aligned text tables, JSON, and CSV.

use std::{
  fs::File,
  io::{self, Write},
  path::Path,
};

use anyhow::{Context as _, bail};
use cohort_core::{
  CohortRecord,
  cohorts::CohortSummary,
  report::ReportHeader,
  retention::{CustomerStatus, RetentionReport},
  segmentation::{CustomerSegment, SegmentationReport},
};

use crate::{Format, run::ReportSet};

// ─── Text tables ─────────────────────────────────────────────────────────────

struct Table {
  headers: Vec<&'static str>,
  rows:    Vec<Vec<String>>,
}

impl Table {
  fn new(headers: &[&'static str]) -> Self {
    Self { headers: headers.to_vec(), rows: Vec::new() }
  }

  fn row(&mut self, cells: Vec<String>) { self.rows.push(cells); }

  fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
    for row in &self.rows {
      for (width, cell) in widths.iter_mut().zip(row) {
        *width = (*width).max(cell.chars().count());
      }
    }

    write_line(w, self.headers.iter().copied(), &widths)?;
    let rule: Vec<String> = widths.iter().map(|n| "-".repeat(*n)).collect();
    write_line(w, rule.iter().map(String::as_str), &widths)?;
    for row in &self.rows {
      write_line(w, row.iter().map(String::as_str), &widths)?;
    }
    Ok(())
  }
}

fn write_line<'a, W: Write>(
  w: &mut W,
  cells: impl Iterator<Item = &'a str>,
  widths: &[usize],
) -> io::Result<()> {
  let padded: Vec<String> = cells
    .zip(widths)
    .map(|(cell, width)| format!("{cell:<pad$}", pad = *width))
    .collect();
  writeln!(w, "{}", padded.join("  ").trim_end())
}

fn money(x: f64) -> String { format!("{x:.2}") }

fn opt_money(x: Option<f64>) -> String { x.map_or_else(|| "-".to_owned(), money) }

fn write_header<W: Write>(w: &mut W, header: &ReportHeader) -> io::Result<()> {
  let s = &header.stats;
  writeln!(w, "dataset {}", &header.fingerprint[..12.min(header.fingerprint.len())])?;
  match header.reference_date {
    Some(date) => writeln!(w, "latest order date {date}")?,
    None => writeln!(w, "latest order date -")?,
  }
  writeln!(
    w,
    "sales {}  customers {}  view rows {}  orphan sales {}  customers without sales {}",
    s.sales, s.customers, s.records, s.orphan_sales, s.customers_without_sales
  )
}

fn segmentation_table<W: Write>(w: &mut W, report: &SegmentationReport) -> io::Result<()> {
  match report.thresholds {
    Some(t) => writeln!(
      w,
      "Customer segmentation (25th pct {}, 75th pct {})",
      money(t.ltv_25th),
      money(t.ltv_75th)
    )?,
    None => writeln!(w, "Customer segmentation (no customers)")?,
  }
  let mut table =
    Table::new(&["customer_segment", "total_ltv", "customer_count", "avg_ltv"]);
  for t in &report.tiers {
    table.row(vec![
      t.tier.to_string(),
      money(t.total_ltv),
      t.customer_count.to_string(),
      opt_money(t.avg_ltv),
    ]);
  }
  table.write(w)
}

fn cohorts_table<W: Write>(w: &mut W, cohorts: &[CohortSummary]) -> io::Result<()> {
  writeln!(w, "Cohort revenue (first purchase day)")?;
  let mut table = Table::new(&[
    "cohort_year",
    "total_revenue",
    "total_customers",
    "customer_revenue",
  ]);
  for c in cohorts {
    table.row(vec![
      c.cohort_year.to_string(),
      money(c.total_revenue),
      c.total_customers.to_string(),
      opt_money(c.customer_revenue),
    ]);
  }
  table.write(w)
}

fn retention_table<W: Write>(w: &mut W, report: &RetentionReport) -> io::Result<()> {
  match report.cutoff {
    Some(cutoff) => writeln!(w, "Retention (churned if no purchase since {cutoff})")?,
    None => writeln!(w, "Retention (no sales)")?,
  }
  let mut table = Table::new(&[
    "cohort_year",
    "customer_status",
    "num_customers",
    "total_customers",
    "status_percentage",
  ]);
  for r in &report.rows {
    table.row(vec![
      r.cohort_year.to_string(),
      r.customer_status.to_string(),
      r.num_customers.to_string(),
      r.total_customers.to_string(),
      format!("{:.2}", r.status_percentage),
    ]);
  }
  table.write(w)
}

fn customer_segments_table<W: Write>(
  w: &mut W,
  segments: &[CustomerSegment],
) -> io::Result<()> {
  writeln!(w, "Customers by segment")?;
  let mut table =
    Table::new(&["customerkey", "cleaned_name", "total_ltv", "customer_segment"]);
  for s in segments {
    table.row(vec![
      s.customerkey.to_string(),
      s.cleaned_name.clone(),
      money(s.total_ltv),
      s.tier.to_string(),
    ]);
  }
  table.write(w)
}

fn customer_statuses_table<W: Write>(
  w: &mut W,
  statuses: &[CustomerStatus],
) -> io::Result<()> {
  writeln!(w, "Customers by status")?;
  let mut table = Table::new(&[
    "customerkey",
    "cleaned_name",
    "cohort_year",
    "first_purchase_date",
    "last_purchase_date",
    "customer_status",
  ]);
  for s in statuses {
    table.row(vec![
      s.customerkey.to_string(),
      s.cleaned_name.clone(),
      s.cohort_year.to_string(),
      s.first_purchase_date.to_string(),
      s.last_purchase_date.to_string(),
      s.status.to_string(),
    ]);
  }
  table.write(w)
}

fn records_table<W: Write>(w: &mut W, records: &[CohortRecord]) -> io::Result<()> {
  let mut table = Table::new(&[
    "customerkey",
    "orderdate",
    "net_revenue",
    "num_orders",
    "countryfull",
    "age",
    "cleaned_name",
    "first_purchase_date",
    "cohort_year",
  ]);
  for r in records {
    table.row(vec![
      r.customerkey.to_string(),
      r.orderdate.to_string(),
      money(r.net_revenue),
      r.num_orders.to_string(),
      r.countryfull.clone(),
      r.age.to_string(),
      r.cleaned_name.clone(),
      r.first_purchase_date.to_string(),
      r.cohort_year.to_string(),
    ]);
  }
  table.write(w)
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Render the cohort view rows.
pub fn render_records<W: Write>(
  w: &mut W,
  records: &[CohortRecord],
  format: Format,
) -> anyhow::Result<()> {
  match format {
    Format::Table => records_table(w, records)?,
    Format::Json => {
      serde_json::to_writer_pretty(&mut *w, records)?;
      writeln!(w)?;
    }
    Format::Csv => cohort_csv::write_records(w, records)?,
  }
  Ok(())
}

/// Render a report set to `w`, or for CSV with `out_dir`, to one file per
/// report in that directory.
pub fn render_reports<W: Write>(
  w: &mut W,
  set: &ReportSet,
  format: Format,
  out_dir: Option<&Path>,
) -> anyhow::Result<()> {
  match (format, out_dir) {
    (Format::Table, _) => render_tables(w, set)?,
    (Format::Json, _) => {
      serde_json::to_writer_pretty(&mut *w, set)?;
      writeln!(w)?;
    }
    (Format::Csv, Some(dir)) => write_csv_files(dir, set)?,
    (Format::Csv, None) => {
      if set.len() != 1 {
        bail!("csv output of {} reports needs --out <DIR>", set.len());
      }
      write_csv(w, set)?;
    }
  }
  Ok(())
}

fn render_tables<W: Write>(w: &mut W, set: &ReportSet) -> io::Result<()> {
  write_header(w, &set.header)?;
  if let Some(report) = &set.segmentation {
    writeln!(w)?;
    segmentation_table(w, report)?;
  }
  if let Some(cohorts) = &set.cohorts {
    writeln!(w)?;
    cohorts_table(w, cohorts)?;
  }
  if let Some(report) = &set.retention {
    writeln!(w)?;
    retention_table(w, report)?;
  }
  if let Some(segments) = &set.customer_segments {
    writeln!(w)?;
    customer_segments_table(w, segments)?;
  }
  if let Some(statuses) = &set.customer_statuses {
    writeln!(w)?;
    customer_statuses_table(w, statuses)?;
  }
  Ok(())
}

/// Write whichever single report is present.
fn write_csv<W: Write>(w: &mut W, set: &ReportSet) -> cohort_csv::Result<()> {
  if let Some(report) = &set.segmentation {
    cohort_csv::write_segmentation(w, report)
  } else if let Some(cohorts) = &set.cohorts {
    cohort_csv::write_cohorts(w, cohorts)
  } else if let Some(report) = &set.retention {
    cohort_csv::write_retention(w, report)
  } else {
    Ok(())
  }
}

fn create(dir: &Path, name: &str) -> anyhow::Result<File> {
  let path = dir.join(name);
  let file =
    File::create(&path).with_context(|| format!("creating {}", path.display()))?;
  tracing::info!(path = %path.display(), "writing report");
  Ok(file)
}

fn write_csv_files(dir: &Path, set: &ReportSet) -> anyhow::Result<()> {
  std::fs::create_dir_all(dir)
    .with_context(|| format!("creating output directory {}", dir.display()))?;

  if let Some(report) = &set.segmentation {
    cohort_csv::write_segmentation(create(dir, "segmentation.csv")?, report)?;
  }
  if let Some(cohorts) = &set.cohorts {
    cohort_csv::write_cohorts(create(dir, "cohorts.csv")?, cohorts)?;
  }
  if let Some(report) = &set.retention {
    cohort_csv::write_retention(create(dir, "retention.csv")?, report)?;
  }
  if let Some(segments) = &set.customer_segments {
    cohort_csv::write_customer_segments(create(dir, "customer_segments.csv")?, segments)?;
  }
  if let Some(statuses) = &set.customer_statuses {
    cohort_csv::write_customer_statuses(create(dir, "customer_statuses.csv")?, statuses)?;
  }
  Ok(())
}
