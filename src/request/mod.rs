//! Request vocabulary: metrics, aggregation granularity, aggregate function,
//! and the raw and validated request types.
//!
//! A [`RawRequest`] is what a tool-calling front-end hands over (loosely typed
//! strings). [`crate::validation::validate`] turns it into a [`QueryRequest`],
//! the only input the compiler accepts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sql::expr::{avg, max, min, Expr};

// =============================================================================
// Metric
// =============================================================================

/// A measurement column that may be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temp,
    Max,
    Min,
    Prcp,
    Wdsp,
    Dewp,
    Slp,
    Sndp,
}

impl Metric {
    /// The allow-list, in canonical order.
    pub const ALL: [Metric; 8] = [
        Metric::Temp,
        Metric::Max,
        Metric::Min,
        Metric::Prcp,
        Metric::Wdsp,
        Metric::Dewp,
        Metric::Slp,
        Metric::Sndp,
    ];

    /// Column name in the measurements table, also the output column name.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Temp => "temp",
            Metric::Max => "max",
            Metric::Min => "min",
            Metric::Prcp => "prcp",
            Metric::Wdsp => "wdsp",
            Metric::Dewp => "dewp",
            Metric::Slp => "slp",
            Metric::Sndp => "sndp",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Metric::Temp => "mean temperature (°F)",
            Metric::Max => "maximum temperature (°F)",
            Metric::Min => "minimum temperature (°F)",
            Metric::Prcp => "total precipitation (inches)",
            Metric::Wdsp => "mean wind speed (knots)",
            Metric::Dewp => "mean dew point (°F)",
            Metric::Slp => "mean sea level pressure (millibars)",
            Metric::Sndp => "snow depth (inches)",
        }
    }

    /// Case-insensitive lookup against the allow-list.
    pub fn parse(name: &str) -> Option<Metric> {
        let name = name.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.column().eq_ignore_ascii_case(name))
    }

    /// Allow-list as a comma-separated string, for error messages.
    pub fn allow_list() -> String {
        Metric::ALL
            .iter()
            .map(Metric::column)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Time granularity requested for the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Per-station daily rows.
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Aggregation {
    pub const ALL: [Aggregation; 4] = [
        Aggregation::None,
        Aggregation::Daily,
        Aggregation::Weekly,
        Aggregation::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::None => "none",
            Aggregation::Daily => "daily",
            Aggregation::Weekly => "weekly",
            Aggregation::Monthly => "monthly",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(value: &str) -> Option<Aggregation> {
        let value = value.trim();
        Aggregation::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(value))
    }

    /// Whether a time bucket was asked for.
    pub fn is_bucketed(&self) -> bool {
        !matches!(self, Aggregation::None)
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MetricAggregation
// =============================================================================

/// Aggregate function applied to metrics when rows are collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricAggregation {
    #[default]
    Avg,
    Min,
    Max,
}

impl MetricAggregation {
    pub const ALL: [MetricAggregation; 3] = [
        MetricAggregation::Avg,
        MetricAggregation::Min,
        MetricAggregation::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricAggregation::Avg => "avg",
            MetricAggregation::Min => "min",
            MetricAggregation::Max => "max",
        }
    }

    /// Case-insensitive lookup. `None` for anything unrecognised; the
    /// validator decides what to do with that.
    pub fn parse(value: &str) -> Option<MetricAggregation> {
        let value = value.trim();
        MetricAggregation::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(value))
    }

    /// Wrap `expr` in this aggregate function.
    pub fn apply(&self, expr: Expr) -> Expr {
        match self {
            MetricAggregation::Avg => avg(expr),
            MetricAggregation::Min => min(expr),
            MetricAggregation::Max => max(expr),
        }
    }
}

impl std::fmt::Display for MetricAggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Requests
// =============================================================================

/// An unvalidated request, as received from a tool call or the command line.
///
/// Unknown JSON fields (such as an output filename meant for a CSV exporter)
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRequest {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default)]
    pub aggregation: Option<String>,
    #[serde(default)]
    pub metric_aggregation: Option<String>,
}

impl RawRequest {
    pub fn new(start_date: &str, end_date: &str, metrics: &[&str]) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            metrics: metrics.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_station(mut self, station_id: &str) -> Self {
        self.station_id = Some(station_id.into());
        self
    }

    pub fn with_aggregation(mut self, aggregation: &str) -> Self {
        self.aggregation = Some(aggregation.into());
        self
    }

    pub fn with_metric_aggregation(mut self, metric_aggregation: &str) -> Self {
        self.metric_aggregation = Some(metric_aggregation.into());
        self
    }
}

/// A validated, normalized request.
///
/// Only [`crate::validation::validate`] constructs one, so holding a
/// `QueryRequest` means every field is within its vocabulary, the date range
/// is ordered and filter values are safe to embed as SQL literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) metrics: Vec<Metric>,
    pub(crate) country: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) station_id: Option<String>,
    pub(crate) aggregation: Aggregation,
    pub(crate) metric_aggregation: MetricAggregation,
}

impl QueryRequest {
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Requested metrics, deduplicated, in request order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Uppercased country code.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Uppercased state code.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn station_id(&self) -> Option<&str> {
        self.station_id.as_deref()
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn metric_aggregation(&self) -> MetricAggregation {
        self.metric_aggregation
    }

    /// Whether any location filter is set.
    pub fn has_location_filter(&self) -> bool {
        self.country.is_some() || self.state.is_some() || self.station_id.is_some()
    }
}
