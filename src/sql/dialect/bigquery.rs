//! BigQuery SQL dialect.
//!
//! BigQuery features:
//! - Backtick identifier quoting, `project.dataset.table` paths
//! - Backslash escapes inside string literals
//! - `DATE_TRUNC(date, WEEK)` with the date part last; weeks start on Sunday

use super::super::expr::DateUnit;
use super::super::token::TokenStream;
use super::helpers;
use super::SqlDialect;

/// BigQuery SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct BigQuery;

impl SqlDialect for BigQuery {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_backslash(s)
    }

    fn emit_date_trunc(&self, unit: DateUnit, operand: &TokenStream) -> TokenStream {
        helpers::emit_date_trunc_unit_last(unit, operand)
    }
}
