//! Validation of weather requests.
//!
//! [`validate`] is the only way to obtain a [`QueryRequest`]. It fails fast:
//! the first problem found is returned and no SQL is ever produced for a
//! rejected request.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::request::{Aggregation, Metric, MetricAggregation, QueryRequest, RawRequest};

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The metrics list was empty.
    #[error("at least one metric is required (choose from: {})", Metric::allow_list())]
    NoMetrics,

    /// A metric outside the allow-list.
    #[error("invalid metric '{metric}' (choose from: {})", Metric::allow_list())]
    InvalidMetric { metric: String },

    /// An aggregation outside {none, daily, weekly, monthly}.
    #[error("invalid aggregation '{value}' (choose from: none, daily, weekly, monthly)")]
    InvalidAggregation { value: String },

    /// A date that is not `YYYY-MM-DD`.
    #[error("invalid {field} '{value}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    /// End date before start date.
    #[error("end_date {end} is before start_date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// A filter value that cannot be embedded as a string literal.
    #[error("{field} value {value:?} contains a quote, backslash or control character")]
    UnsafeLiteral { field: &'static str, value: String },
}

/// Validate and normalize a raw request.
pub fn validate(raw: &RawRequest) -> Result<QueryRequest, ValidationError> {
    let metrics = validate_metrics(&raw.metrics)?;

    let aggregation = match raw.aggregation.as_deref() {
        None => Aggregation::default(),
        Some(value) => Aggregation::parse(value).ok_or_else(|| {
            ValidationError::InvalidAggregation {
                value: value.to_string(),
            }
        })?,
    };

    let metric_aggregation = resolve_metric_aggregation(raw.metric_aggregation.as_deref());

    let start_date = parse_date("start_date", &raw.start_date)?;
    let end_date = parse_date("end_date", &raw.end_date)?;
    if end_date < start_date {
        return Err(ValidationError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    let country = normalize_filter("country", raw.country.as_deref(), true)?;
    let state = normalize_filter("state", raw.state.as_deref(), true)?;
    let station_id = normalize_filter("station_id", raw.station_id.as_deref(), false)?;

    let request = QueryRequest {
        start_date,
        end_date,
        metrics,
        country,
        state,
        station_id,
        aggregation,
        metric_aggregation,
    };

    debug!(
        start = %request.start_date,
        end = %request.end_date,
        metrics = request.metrics.len(),
        aggregation = %request.aggregation,
        metric_aggregation = %request.metric_aggregation,
        "validated request"
    );

    Ok(request)
}

fn validate_metrics(names: &[String]) -> Result<Vec<Metric>, ValidationError> {
    if names.is_empty() {
        return Err(ValidationError::NoMetrics);
    }

    let mut metrics = Vec::with_capacity(names.len());
    for name in names {
        let metric = Metric::parse(name).ok_or_else(|| ValidationError::InvalidMetric {
            metric: name.clone(),
        })?;
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    Ok(metrics)
}

/// Unrecognised values fall back to `avg` rather than failing the request.
fn resolve_metric_aggregation(value: Option<&str>) -> MetricAggregation {
    match value {
        None => MetricAggregation::default(),
        Some(v) => MetricAggregation::parse(v).unwrap_or_else(|| {
            warn!(value = v, "unrecognised metric_aggregation, using avg");
            MetricAggregation::Avg
        }),
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn normalize_filter(
    field: &'static str,
    value: Option<&str>,
    uppercase: bool,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.chars().any(is_unsafe_char) {
        return Err(ValidationError::UnsafeLiteral {
            field,
            value: value.to_string(),
        });
    }

    Ok(Some(if uppercase {
        value.to_uppercase()
    } else {
        value.to_string()
    }))
}

fn is_unsafe_char(c: char) -> bool {
    matches!(c, '\'' | '"' | '`' | '\\') || c.is_control()
}
