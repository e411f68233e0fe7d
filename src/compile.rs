//! Compilation of validated weather requests to SQL.
//!
//! ```text
//! RawRequest → validate → QueryRequest → QueryShape → Query → SQL
//! ```
//!
//! Every decision about the query's structure is taken from a
//! [`QueryShape`], three values derived once from the request. The SQL text
//! is produced only at the end, by rendering the built [`Query`].
//!
//! # Example
//!
//! ```
//! use gsod_query::compile::{compile, CompileOptions};
//! use gsod_query::request::RawRequest;
//! use gsod_query::validation::validate;
//!
//! let raw = RawRequest::new("2024-01-01", "2024-01-07", &["temp", "prcp"]).with_state("CA");
//! let request = validate(&raw).unwrap();
//! let compiled = compile(&request, &CompileOptions::default());
//!
//! assert!(compiled.uses_join);
//! assert_eq!(
//!     compiled.expected_columns,
//!     vec!["date", "station_id", "name", "country", "state", "temp", "prcp"]
//! );
//! ```

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::Settings;
use crate::request::{Aggregation, QueryRequest, RawRequest};
use crate::schema::{
    measurements, stations, Dimension, WarehouseSchema, MEASUREMENTS_ALIAS, STATIONS_ALIAS,
};
use crate::sql::expr::{date_trunc, lit_date, lit_str, table_col, DateUnit, Expr, ExprExt};
use crate::sql::query::{Query, SelectExpr};
use crate::sql::Dialect;
use crate::validation::{validate, ValidationError};

/// Row cap applied when nothing else is configured.
pub const DEFAULT_MAX_ROWS: u64 = 10_000;

/// Largest row cap the warehouses accept; LIMIT is a signed 64-bit integer.
pub const MAX_ROWS_LIMIT: u64 = i64::MAX as u64;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// SQL dialect to generate.
    pub dialect: Dialect,
    /// Where the measurements and stations tables live.
    pub schema: WarehouseSchema,
    /// LIMIT applied to every query.
    pub max_rows: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::BigQuery,
            schema: WarehouseSchema::default(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl CompileOptions {
    /// Options taken from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dialect: settings.warehouse.dialect,
            schema: WarehouseSchema::new(
                &settings.warehouse.measurements_table,
                &settings.warehouse.stations_table,
            ),
            max_rows: settings.query.max_rows.min(MAX_ROWS_LIMIT),
        }
    }

    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the table locations.
    pub fn with_schema(mut self, schema: WarehouseSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the row cap, capped at [`MAX_ROWS_LIMIT`].
    pub fn with_max_rows(mut self, max_rows: u64) -> Self {
        self.max_rows = max_rows.min(MAX_ROWS_LIMIT);
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling a request.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledQuery {
    /// A single SELECT statement.
    pub sql_text: String,

    /// Output column names, in projection order.
    pub expected_columns: Vec<String>,

    /// Whether the stations table is joined in.
    pub uses_join: bool,

    /// The dialect used for generation.
    pub dialect: Dialect,

    /// The SQL query AST (for further manipulation if needed).
    #[serde(skip)]
    pub query: Query,
}

// ============================================================================
// Query Shape
// ============================================================================

/// The structural decisions for one request.
///
/// Every combination of the two flags and the aggregation compiles to valid
/// SQL; only some are reachable from a validated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryShape {
    /// The stations table is joined in.
    pub uses_join: bool,
    /// Rows stay per station instead of being collapsed.
    pub include_dimensions: bool,
    /// Requested time granularity.
    pub aggregation: Aggregation,
}

impl QueryShape {
    /// Derive the shape from a request.
    ///
    /// A join is needed for any location filter. A single station, or no
    /// aggregation at all, keeps per-row output.
    pub fn from_request(request: &QueryRequest) -> Self {
        Self {
            uses_join: request.has_location_filter(),
            include_dimensions: request.aggregation() == Aggregation::None
                || request.station_id().is_some(),
            aggregation: request.aggregation(),
        }
    }

    pub fn should_aggregate_metrics(&self) -> bool {
        !self.include_dimensions
    }

    /// Station attributes only exist when the stations table is joined.
    ///
    /// Joined rows keep them for per-row output and for every time bucket,
    /// so a bucketed aggregate stays broken down by station.
    pub fn projects_dimensions(&self) -> bool {
        self.uses_join && (self.include_dimensions || self.aggregation.is_bucketed())
    }

    /// The date column is dropped only for an overall aggregate over the
    /// joined tables with no time bucket.
    pub fn includes_date(&self) -> bool {
        self.aggregation.is_bucketed() || self.include_dimensions || !self.uses_join
    }

    /// Period the date is truncated to, if any.
    pub fn truncation(&self) -> Option<DateUnit> {
        if !self.should_aggregate_metrics() {
            return None;
        }
        match self.aggregation {
            Aggregation::Weekly => Some(DateUnit::Week),
            Aggregation::Monthly => Some(DateUnit::Month),
            Aggregation::None | Aggregation::Daily => None,
        }
    }
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Compile a validated request to SQL.
///
/// Never fails: every request that passed validation has a valid query.
pub fn compile(request: &QueryRequest, options: &CompileOptions) -> CompiledQuery {
    let shape = QueryShape::from_request(request);
    debug!(
        uses_join = shape.uses_join,
        include_dimensions = shape.include_dimensions,
        should_aggregate_metrics = shape.should_aggregate_metrics(),
        aggregation = %shape.aggregation,
        dialect = %options.dialect,
        "compiling request"
    );
    compile_shape(request, shape, options)
}

/// Validate a raw request and compile it.
pub fn compile_raw(
    raw: &RawRequest,
    options: &CompileOptions,
) -> Result<CompiledQuery, ValidationError> {
    let request = validate(raw)?;
    Ok(compile(&request, options))
}

fn compile_shape(
    request: &QueryRequest,
    shape: QueryShape,
    options: &CompileOptions,
) -> CompiledQuery {
    let mut projection: Vec<SelectExpr> = Vec::new();
    // Non-aggregated projected expressions; grouped when metrics are aggregated.
    let mut grouping: Vec<Expr> = Vec::new();

    let date_expr = shape.includes_date().then(|| {
        let raw = table_col(MEASUREMENTS_ALIAS, measurements::DATE);
        match shape.truncation() {
            Some(unit) => date_trunc(raw, unit),
            None => raw,
        }
    });

    if let Some(date) = &date_expr {
        let item = SelectExpr::new(date.clone());
        projection.push(match date {
            Expr::Column { .. } => item,
            _ => item.with_alias(measurements::DATE),
        });
        grouping.push(date.clone());
    }

    if shape.projects_dimensions() {
        for dimension in Dimension::ALL {
            projection.push(dimension.select_expr());
            grouping.push(dimension.column());
        }
    }

    for metric in request.metrics() {
        let column = table_col(MEASUREMENTS_ALIAS, metric.column());
        projection.push(if shape.should_aggregate_metrics() {
            request.metric_aggregation().apply(column).alias(metric.column())
        } else {
            SelectExpr::new(column)
        });
    }

    let mut query = Query::new()
        .select(projection)
        .from(options.schema.measurements_ref());

    if shape.uses_join {
        query = query.inner_join(options.schema.stations_ref(), options.schema.join_condition());
    }

    query = query.filter(predicates(request));

    if shape.should_aggregate_metrics() && !grouping.is_empty() {
        query = query.group_by(grouping);
    }

    if let Some(date) = date_expr {
        query = query.order_by(vec![date]);
    }

    let query = query.limit(options.max_rows);
    // Every projected item is a bare column or aliased, so each has a name.
    let expected_columns: Vec<String> = query
        .output_names()
        .into_iter()
        .flatten()
        .map(String::from)
        .collect();
    let sql_text = query.to_sql(options.dialect);
    trace!(sql = %sql_text, "compiled query");

    CompiledQuery {
        sql_text,
        expected_columns,
        uses_join: shape.uses_join,
        dialect: options.dialect,
        query,
    }
}

/// WHERE conditions: the inclusive date range, then each location filter.
fn predicates(request: &QueryRequest) -> Expr {
    let date = || table_col(MEASUREMENTS_ALIAS, measurements::DATE);
    let mut condition = date()
        .gte(lit_date(request.start_date()))
        .and(date().lte(lit_date(request.end_date())));

    if let Some(country) = request.country() {
        condition =
            condition.and(table_col(STATIONS_ALIAS, stations::COUNTRY).eq(lit_str(country)));
    }
    if let Some(state) = request.state() {
        condition = condition.and(table_col(STATIONS_ALIAS, stations::STATE).eq(lit_str(state)));
    }
    if let Some(station_id) = request.station_id() {
        condition =
            condition.and(table_col(MEASUREMENTS_ALIAS, measurements::STN).eq(lit_str(station_id)));
    }

    condition
}

// ============================================================================
// Tests
// ============================================================================
