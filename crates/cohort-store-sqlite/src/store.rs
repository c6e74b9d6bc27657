//! [`SqliteStore`]: the SQLite implementation of [`SalesSource`].

use std::path::Path;

use cohort_core::{
  model::{CohortRecord, Customer, Sale},
  source::SalesSource,
};

use crate::{
  Result,
  encode::{RawCohortRecord, RawSale, customer_from_row, encode_date},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Sales and customer tables in a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// Delete every sale and customer.
  pub async fn clear(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("DELETE FROM sales; DELETE FROM customer;")?;
        Ok(())
      })
      .await?;
    tracing::debug!("cleared source tables");
    Ok(())
  }

  /// Insert `customers` in one transaction. A duplicate `customerkey` fails
  /// the whole batch.
  pub async fn insert_customers(&self, customers: Vec<Customer>) -> Result<usize> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = insert_customer_rows(&tx, &customers)?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    tracing::info!(rows = written, "inserted customers");
    Ok(written)
  }

  /// Insert `sales` in one transaction.
  pub async fn insert_sales(&self, sales: Vec<Sale>) -> Result<usize> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = insert_sale_rows(&tx, &sales)?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    tracing::info!(rows = written, "inserted sales");
    Ok(written)
  }

  /// Replace both tables with `customers` and `sales` atomically. On error the
  /// previous contents are left untouched.
  pub async fn replace(
    &self,
    customers: Vec<Customer>,
    sales: Vec<Sale>,
  ) -> Result<(usize, usize)> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute_batch("DELETE FROM sales; DELETE FROM customer;")?;
        let c = insert_customer_rows(&tx, &customers)?;
        let s = insert_sale_rows(&tx, &sales)?;
        tx.commit()?;
        Ok((c, s))
      })
      .await?;

    tracing::info!(customers = written.0, sales = written.1, "replaced source tables");
    Ok(written)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Read the `cohort_analysis` view, ordered by customer then order date.
  pub async fn cohort_view(&self) -> Result<Vec<CohortRecord>> {
    let raws: Vec<RawCohortRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT
             customerkey, orderdate, net_revenue, num_orders, countryfull, age,
             cleaned_name, first_purchase_date, cohort_year
           FROM cohort_analysis
           ORDER BY customerkey, orderdate",
        )?;
        let rows = stmt
          .query_map([], RawCohortRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCohortRecord::into_record).collect()
  }
}

// ─── Row writers ─────────────────────────────────────────────────────────────

fn insert_customer_rows(
  tx: &rusqlite::Transaction<'_>,
  customers: &[Customer],
) -> rusqlite::Result<usize> {
  let mut stmt = tx.prepare(
    "INSERT INTO customer (customerkey, countryfull, age, givenname, surname)
     VALUES (?1, ?2, ?3, ?4, ?5)",
  )?;
  for c in customers {
    stmt.execute(rusqlite::params![
      c.customerkey,
      c.countryfull,
      c.age,
      c.givenname,
      c.surname,
    ])?;
  }
  Ok(customers.len())
}

fn insert_sale_rows(tx: &rusqlite::Transaction<'_>, sales: &[Sale]) -> rusqlite::Result<usize> {
  let mut stmt = tx.prepare(
    "INSERT INTO sales (
       orderkey, customerkey, orderdate, quantity, netprice, exchangerate
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;
  for s in sales {
    stmt.execute(rusqlite::params![
      s.orderkey,
      s.customerkey,
      encode_date(s.orderdate),
      s.quantity,
      s.netprice,
      s.exchangerate,
    ])?;
  }
  Ok(sales.len())
}

// ─── SalesSource impl ────────────────────────────────────────────────────────

impl SalesSource for SqliteStore {
  type Error = crate::Error;

  async fn load_sales(&self) -> Result<Vec<Sale>> {
    let raws: Vec<RawSale> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT orderkey, customerkey, orderdate, quantity, netprice, exchangerate
           FROM sales",
        )?;
        let rows = stmt
          .query_map([], RawSale::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSale::into_sale).collect()
  }

  async fn load_customers(&self) -> Result<Vec<Customer>> {
    let customers = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT customerkey, countryfull, age, givenname, surname FROM customer",
        )?;
        let rows = stmt
          .query_map([], customer_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(customers)
  }
}
