//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible for everything the weather queries use:
//! ANSI identifier quoting (`"`), `''` string escapes and
//! `DATE_TRUNC('week', date)` with ISO (Monday) weeks.

use super::helpers;
use super::SqlDialect;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    // Uses default quote_string, emit_limit and emit_date_trunc
}
