//! SQL schema for the cohort SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS customer (
    customerkey  INTEGER PRIMARY KEY,
    countryfull  TEXT    NOT NULL,
    age          INTEGER NOT NULL,
    givenname    TEXT    NOT NULL,
    surname      TEXT    NOT NULL
);

-- No foreign key on customerkey: sales for unknown customers are kept and
-- dropped later by the inner join in cohort_analysis.
CREATE TABLE IF NOT EXISTS sales (
    orderkey      INTEGER NOT NULL,
    customerkey   INTEGER NOT NULL,
    orderdate     TEXT    NOT NULL,   -- YYYY-MM-DD
    quantity      INTEGER NOT NULL,
    netprice      REAL    NOT NULL,
    exchangerate  REAL    NOT NULL
);

CREATE INDEX IF NOT EXISTS sales_customer_date_idx ON sales(customerkey, orderdate);

-- One row per customer per order date, labelled with the customer's cohort.
CREATE VIEW IF NOT EXISTS cohort_analysis AS
WITH customer_revenue AS (
    SELECT
        s.customerkey,
        s.orderdate,
        SUM(s.quantity * s.netprice * s.exchangerate) AS net_revenue,
        COUNT(s.orderkey)                             AS num_orders,
        MAX(c.countryfull)                            AS countryfull,
        MAX(c.age)                                    AS age,
        MAX(c.givenname)                              AS givenname,
        MAX(c.surname)                                AS surname
    FROM sales s
    INNER JOIN customer c ON c.customerkey = s.customerkey
    GROUP BY s.customerkey, s.orderdate
)
SELECT
    customerkey,
    orderdate,
    net_revenue,
    num_orders,
    countryfull,
    age,
    trim(givenname) || ' ' || trim(surname)          AS cleaned_name,
    MIN(orderdate) OVER (PARTITION BY customerkey)   AS first_purchase_date,
    CAST(strftime('%Y', MIN(orderdate) OVER (PARTITION BY customerkey)) AS INTEGER)
                                                     AS cohort_year
FROM customer_revenue;

PRAGMA user_version = 1;
";
