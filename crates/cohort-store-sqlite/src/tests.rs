//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use cohort_core::{
  model::{Customer, Sale},
  source::{SalesSource, load_snapshot},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn customer(key: i64, given: &str, surname: &str) -> Customer {
  Customer {
    customerkey: key,
    countryfull: "Netherlands".into(),
    age:         28,
    givenname:   given.into(),
    surname:     surname.into(),
  }
}

fn sale(key: i64, orderkey: i64, orderdate: NaiveDate, quantity: i64, netprice: f64) -> Sale {
  Sale {
    customerkey: key,
    orderkey,
    orderdate,
    quantity,
    netprice,
    exchangerate: 1.0,
  }
}

async fn seeded() -> SqliteStore {
  let s = store().await;
  s.insert_customers(vec![
    customer(1, " Ada ", "Lovelace "),
    customer(2, "Alan", "Turing"),
    customer(3, "Grace", "Hopper"),
  ])
  .await
  .unwrap();
  s.insert_sales(vec![
    sale(1, 10, date(2023, 1, 5), 2, 10.0),
    sale(1, 11, date(2023, 1, 5), 1, 5.0),
    sale(1, 12, date(2024, 2, 1), 1, 7.5),
    sale(2, 13, date(2022, 6, 30), 3, 1.5),
    // No such customer.
    sale(42, 14, date(2024, 6, 1), 1, 99.0),
  ])
  .await
  .unwrap();
  s
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_load_round_trip() {
  let s = seeded().await;

  let mut sales = s.load_sales().await.unwrap();
  sales.sort_by_key(|s| s.orderkey);
  assert_eq!(sales.len(), 5);
  assert_eq!(sales[0], sale(1, 10, date(2023, 1, 5), 2, 10.0));

  let customers = s.load_customers().await.unwrap();
  assert_eq!(customers.len(), 3);
  assert!(customers.iter().any(|c| c.givenname == " Ada "));
}

#[tokio::test]
async fn duplicate_customer_fails_whole_batch() {
  let s = store().await;
  let result = s
    .insert_customers(vec![customer(1, "A", "B"), customer(1, "C", "D")])
    .await;
  assert!(matches!(result, Err(Error::Database(_))));
  assert!(s.load_customers().await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_empties_both_tables() {
  let s = seeded().await;
  s.clear().await.unwrap();
  assert!(s.load_sales().await.unwrap().is_empty());
  assert!(s.load_customers().await.unwrap().is_empty());
}

#[tokio::test]
async fn replace_swaps_contents() {
  let s = seeded().await;
  let written = s
    .replace(
      vec![customer(5, "Edsger", "Dijkstra")],
      vec![sale(5, 50, date(2020, 1, 1), 1, 2.0)],
    )
    .await
    .unwrap();
  assert_eq!(written, (1, 1));

  let customers = s.load_customers().await.unwrap();
  assert_eq!(customers.len(), 1);
  assert_eq!(customers[0].customerkey, 5);
  assert_eq!(s.load_sales().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_replace_keeps_previous_rows() {
  let s = seeded().await;
  let result = s
    .replace(vec![customer(7, "A", "B"), customer(7, "C", "D")], vec![])
    .await;
  assert!(result.is_err());
  assert_eq!(s.load_customers().await.unwrap().len(), 3);
  assert_eq!(s.load_sales().await.unwrap().len(), 5);
}

#[tokio::test]
async fn malformed_stored_date_is_fatal() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO sales VALUES (1, 1, '01/05/2023', 1, 1.0, 1.0)",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  assert!(matches!(s.load_sales().await, Err(Error::DateParse(_))));
}

// ─── cohort_analysis view ────────────────────────────────────────────────────

#[tokio::test]
async fn sql_view_aggregates_per_customer_day() {
  let s = seeded().await;
  let records = s.cohort_view().await.unwrap();

  // Orphan sale for customer 42 is dropped; customer 3 has no sales.
  assert_eq!(records.len(), 3);

  let first = &records[0];
  assert_eq!(first.customerkey, 1);
  assert_eq!(first.orderdate, date(2023, 1, 5));
  assert_eq!(first.net_revenue, 25.0);
  assert_eq!(first.num_orders, 2);
  assert_eq!(first.cleaned_name, "Ada Lovelace");
  assert_eq!(first.first_purchase_date, date(2023, 1, 5));
  assert_eq!(first.cohort_year, 2023);

  let later = &records[1];
  assert_eq!(later.orderdate, date(2024, 2, 1));
  assert_eq!(later.first_purchase_date, date(2023, 1, 5));
  assert_eq!(later.cohort_year, 2023);
}

#[tokio::test]
async fn sql_view_matches_in_memory_builder() {
  let s = seeded().await;
  let from_sql = s.cohort_view().await.unwrap();
  let snapshot = load_snapshot(&s).await.unwrap();
  let built = snapshot.records();

  assert_eq!(from_sql.len(), built.len());
  for (a, b) in from_sql.iter().zip(built) {
    assert_eq!(a.customerkey, b.customerkey);
    assert_eq!(a.orderdate, b.orderdate);
    assert_eq!(a.num_orders, b.num_orders);
    assert_eq!(a.cleaned_name, b.cleaned_name);
    assert_eq!(a.first_purchase_date, b.first_purchase_date);
    assert_eq!(a.cohort_year, b.cohort_year);
    assert!((a.net_revenue - b.net_revenue).abs() < 1e-9);
  }
}

#[tokio::test]
async fn snapshot_reference_date_covers_orphans() {
  let s = seeded().await;
  let snapshot = load_snapshot(&s).await.unwrap();
  assert_eq!(snapshot.reference_date(), Some(date(2024, 6, 1)));
  assert_eq!(snapshot.stats().orphan_sales, 1);
  assert_eq!(snapshot.stats().customers_without_sales, 1);
}

#[tokio::test]
async fn invalid_stored_sale_surfaces_as_core_error() {
  let s = store().await;
  s.insert_customers(vec![customer(1, "A", "B")]).await.unwrap();
  s.insert_sales(vec![sale(1, 1, date(2023, 1, 1), -2, 3.0)])
    .await
    .unwrap();

  assert!(matches!(load_snapshot(&s).await, Err(Error::Core(_))));
}

// ─── On disk ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopened_file_keeps_rows() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("sales.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert_customers(vec![customer(1, "A", "B")]).await.unwrap();
    s.insert_sales(vec![sale(1, 1, date(2023, 1, 1), 1, 3.0)])
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.load_sales().await.unwrap().len(), 1);
  assert_eq!(s.cohort_view().await.unwrap().len(), 1);
}
