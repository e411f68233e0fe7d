//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::super::expr::DateUnit;
use super::super::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: BigQuery
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "\\`"))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes, doubling embedded quotes (standard SQL).
/// Used by: Postgres, DuckDB
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string with single quotes, backslash-escaping `\` and `'`.
/// Used by: BigQuery (GoogleSQL does not accept `''` inside a literal)
pub fn quote_string_backslash(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

// =============================================================================
// Row Cap
// =============================================================================

/// Emit `LIMIT n` (standard SQL).
/// Used by: Postgres, DuckDB, BigQuery
pub fn emit_limit_standard(limit: u64) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Limit).space().push(Token::LitInt(limit));
    ts
}

// =============================================================================
// Date Truncation
// =============================================================================

/// Emit `DATE_TRUNC('week', expr)`, unit first as a string literal.
/// Used by: Postgres, DuckDB
pub fn emit_date_trunc_unit_first(unit: DateUnit, operand: &TokenStream) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("DATE_TRUNC".into()))
        .lparen()
        .push(Token::LitString(unit.keyword().to_lowercase()))
        .comma()
        .space()
        .append(operand)
        .rparen();
    ts
}

/// Emit `DATE_TRUNC(expr, WEEK)`, unit last as a bare date part.
/// Used by: BigQuery
pub fn emit_date_trunc_unit_last(unit: DateUnit, operand: &TokenStream) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("DATE_TRUNC".into()))
        .lparen()
        .append(operand)
        .comma()
        .space()
        .push(Token::Raw(unit.keyword().into()))
        .rparen();
    ts
}
