//! # gsod-query
//!
//! A parametric SQL query builder for NOAA GSOD daily weather data.
//!
//! ## Architecture
//!
//! A small structured request is validated, reduced to a query shape and
//! built into a SQL AST that is rendered for one of three dialects:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              RawRequest (tool call / CLI flags)          │
//! │  (dates, metrics, location filters, aggregation)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    QueryRequest                          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile: QueryShape]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Query AST (measurements ⋈ stations, GROUP BY)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql: dialect rendering]
//! ┌─────────────────────────────────────────────────────────┐
//! │     CompiledQuery (sql_text, expected_columns, join)     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Executing the query, exporting rows and charting are left to the caller.

pub mod compile;
pub mod config;
pub mod request;
pub mod schema;
pub mod sql;
pub mod validation;

// Re-export SQL submodules at crate level
pub use sql::dialect;
pub use sql::expr;
pub use sql::query;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile, compile_raw, CompileOptions, CompiledQuery, QueryShape};
    pub use crate::config::{Settings, SettingsError};
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::request::{Aggregation, Metric, MetricAggregation, QueryRequest, RawRequest};
    pub use crate::schema::WarehouseSchema;
    pub use crate::validation::{validate, ValidationError};
}

// Also export at crate root for convenience
pub use compile::{compile, CompileOptions, CompiledQuery};
pub use dialect::Dialect;
pub use request::{QueryRequest, RawRequest};
pub use validation::{validate, ValidationError};
