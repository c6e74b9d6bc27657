//! `cohort`: customer segmentation, cohort revenue and retention reports.
//!
//! Reads `cohort.toml` (or the path given with `--config`) if present, then
//! `COHORT_*` environment variables; flags override both.
//!
//! # Usage
//!
//! ```
//! cohort import --sales sales.csv --customers customer.csv
//! cohort report all --detail
//! cohort report retention --format csv > retention.csv
//! cohort report all --format csv --out reports/
//! cohort view --format json
//! ```

use std::{io, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cohort_cli::{
  Format, Settings,
  commands::{self, Input, ReportOptions},
  run::Selection,
  settings::expand_tilde,
};
use cohort_core::retention::RetentionPolicy;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Customer cohort analytics")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cohort.toml")]
  config: PathBuf,

  /// SQLite database holding the sales and customer tables.
  #[arg(long, value_name = "PATH")]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Replace the database contents with sales and customers from CSV.
  Import {
    #[arg(long, value_name = "FILE")]
    sales:     PathBuf,
    #[arg(long, value_name = "FILE")]
    customers: PathBuf,
  },

  /// Print the per-customer, per-day cohort view.
  View {
    #[arg(long, value_enum)]
    format: Option<Format>,
  },

  /// Compute reports.
  Report {
    #[arg(value_enum, default_value_t = Selection::All)]
    which: Selection,

    /// Include per-customer segment and churn listings.
    #[arg(long)]
    detail: bool,

    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Months without a purchase before a customer counts as churned.
    #[arg(long, value_name = "N")]
    inactivity_months: Option<u32>,

    /// Read sales from this CSV file instead of the database.
    #[arg(long, value_name = "FILE", requires = "customers")]
    sales: Option<PathBuf>,

    /// Read customers from this CSV file instead of the database.
    #[arg(long, value_name = "FILE", requires = "sales")]
    customers: Option<PathBuf>,

    /// Directory for CSV output, one file per report.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries the reports.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config).context("failed to read config file")?;
  if let Some(database) = cli.database {
    settings.database = database;
  }
  let database = expand_tilde(&settings.database);
  let mut stdout = io::stdout().lock();

  match cli.command {
    Command::Import { sales, customers } => {
      let (c, s) = commands::import(&database, &sales, &customers).await?;
      tracing::info!(
        database = %database.display(),
        customers = c,
        sales = s,
        "import complete"
      );
    }
    Command::View { format } => {
      commands::view(&database, format.unwrap_or(settings.format), &mut stdout).await?;
    }
    Command::Report {
      which,
      detail,
      format,
      inactivity_months,
      sales,
      customers,
      out,
    } => {
      let input = match (sales, customers) {
        (Some(sales), Some(customers)) => Input::Csv { sales, customers },
        _ => Input::Database(database),
      };
      let options = ReportOptions {
        input,
        selection: which,
        policy: RetentionPolicy {
          inactivity_months: inactivity_months.unwrap_or(settings.inactivity_months),
        },
        detail,
        format: format.unwrap_or(settings.format),
        out_dir: out,
      };
      commands::report(&options, &mut stdout).await?;
    }
  }

  Ok(())
}
