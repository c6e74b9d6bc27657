//! `import`, `view` and `report`.

use std::{
  io::Write,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use cohort_core::{Snapshot, retention::RetentionPolicy, source::load_snapshot};
use cohort_csv::CsvSource;
use cohort_store_sqlite::SqliteStore;

use crate::{
  Format,
  render::{render_records, render_reports},
  run::{Selection, run_reports},
};

async fn open_store(database: &Path) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(database)
    .await
    .with_context(|| format!("failed to open database at {}", database.display()))
}

/// Replace the database contents with the two CSV files.
///
/// Both files are parsed and the view is built before anything is written, so
/// invalid input leaves the database untouched.
pub async fn import(
  database: &Path,
  sales: &Path,
  customers: &Path,
) -> anyhow::Result<(usize, usize)> {
  let source = CsvSource::new(sales, customers);
  let snapshot = load_snapshot(&source)
    .await
    .context("failed to load csv input")?;

  let stats = snapshot.stats();
  if stats.orphan_sales > 0 {
    tracing::warn!(
      orphan_sales = stats.orphan_sales,
      "sales reference unknown customers and will be left out of every report"
    );
  }

  let store = open_store(database).await?;
  let written = store
    .replace(snapshot.customers().to_vec(), snapshot.sales().to_vec())
    .await
    .context("failed to write database")?;
  Ok(written)
}

/// Print the `cohort_analysis` view from the database.
pub async fn view<W: Write>(database: &Path, format: Format, out: &mut W) -> anyhow::Result<()> {
  let store = open_store(database).await?;
  let records = store
    .cohort_view()
    .await
    .context("failed to read cohort view")?;
  tracing::debug!(rows = records.len(), "read cohort view");
  render_records(out, &records, format)
}

/// Where `report` reads its input from.
#[derive(Debug, Clone)]
pub enum Input {
  Database(PathBuf),
  Csv { sales: PathBuf, customers: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
  pub input:     Input,
  pub selection: Selection,
  pub policy:    RetentionPolicy,
  pub detail:    bool,
  pub format:    Format,
  pub out_dir:   Option<PathBuf>,
}

async fn load(input: &Input) -> anyhow::Result<Snapshot> {
  match input {
    Input::Database(path) => {
      let store = open_store(path).await?;
      Ok(load_snapshot(&store).await.context("failed to load database")?)
    }
    Input::Csv { sales, customers } => {
      let source = CsvSource::new(sales, customers);
      Ok(load_snapshot(&source).await.context("failed to load csv input")?)
    }
  }
}

/// Compute and render the selected reports.
pub async fn report<W: Write>(options: &ReportOptions, out: &mut W) -> anyhow::Result<()> {
  let snapshot = Arc::new(load(&options.input).await?);
  let set = run_reports(snapshot, options.selection, options.policy, options.detail).await?;
  render_reports(out, &set, options.format, options.out_dir.as_deref())
}
