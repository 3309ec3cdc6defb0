/// DuckDB initialization SQL.
///
/// Executed once at open time via `Connection::execute_batch`. Every
/// statement uses `IF NOT EXISTS`, so re-running it on startup is a no-op.
///
/// Timestamps are stored as `date_ms BIGINT` (Unix epoch milliseconds, UTC).
/// Each table also carries a `seq` column fed by its own sequence so rows
/// inserted within the same millisecond keep insertion order.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `PULSEBOARD_DUCKDB_MEMORY`, default `"1GB"`).
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

CREATE SEQUENCE IF NOT EXISTS overview_seq;
CREATE TABLE IF NOT EXISTS overview (
    id              VARCHAR PRIMARY KEY,
    seq             BIGINT NOT NULL DEFAULT nextval('overview_seq'),
    revenue         DOUBLE NOT NULL,
    users           BIGINT NOT NULL,
    conversions     BIGINT NOT NULL,
    growth          DOUBLE NOT NULL,
    date_ms         BIGINT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_overview_date ON overview(date_ms);

CREATE SEQUENCE IF NOT EXISTS campaigns_seq;
CREATE TABLE IF NOT EXISTS campaigns (
    id              VARCHAR PRIMARY KEY,
    seq             BIGINT NOT NULL DEFAULT nextval('campaigns_seq'),
    campaign        VARCHAR NOT NULL,
    conversions     BIGINT NOT NULL,
    date_ms         BIGINT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_campaigns_date ON campaigns(date_ms);

CREATE SEQUENCE IF NOT EXISTS revenue_seq;
CREATE TABLE IF NOT EXISTS revenue (
    id              VARCHAR PRIMARY KEY,
    seq             BIGINT NOT NULL DEFAULT nextval('revenue_seq'),
    revenue         DOUBLE NOT NULL,
    source          VARCHAR,
    region          VARCHAR,
    date_ms         BIGINT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_revenue_date ON revenue(date_ms);
"#
    )
}

/// Migrations tracking table, created before [`init_sql`] runs.
pub const MIGRATIONS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS _migrations (
    id          VARCHAR PRIMARY KEY,
    applied_at  TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Numbered migrations applied after [`init_sql`], in order.
///
/// Each runs once; its id is recorded in `_migrations`. Append new entries
/// as `("0001_name", "SQL...")` when a released schema changes.
pub const MIGRATIONS: &[(&str, &str)] = &[];
