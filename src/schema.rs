//! The two-table GSOD schema the compiler targets.
//!
//! Measurements (`m`) hold one row per station per day, keyed by
//! `(stn, wban, date)`. Stations (`s`) hold metadata keyed by `(usaf, wban)`.

use crate::sql::expr::{table_col, Expr, ExprExt};
use crate::sql::query::{SelectExpr, TableRef};

/// Alias of the measurements table.
pub const MEASUREMENTS_ALIAS: &str = "m";
/// Alias of the stations table.
pub const STATIONS_ALIAS: &str = "s";

pub const DEFAULT_MEASUREMENTS_TABLE: &str = "bigquery-public-data.noaa_gsod.gsod2024";
pub const DEFAULT_STATIONS_TABLE: &str = "bigquery-public-data.noaa_gsod.stations";

/// Measurement columns.
pub mod measurements {
    pub const DATE: &str = "date";
    pub const STN: &str = "stn";
    pub const WBAN: &str = "wban";
}

/// Station columns.
pub mod stations {
    pub const USAF: &str = "usaf";
    pub const WBAN: &str = "wban";
    pub const NAME: &str = "name";
    pub const COUNTRY: &str = "country";
    pub const STATE: &str = "state";
}

/// Per-station attribute columns projected in a dimensional breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    StationId,
    Name,
    Country,
    State,
}

impl Dimension {
    /// Projection order.
    pub const ALL: [Dimension; 4] = [
        Dimension::StationId,
        Dimension::Name,
        Dimension::Country,
        Dimension::State,
    ];

    /// Source column. Station id comes from the measurements side.
    pub fn column(&self) -> Expr {
        match self {
            Dimension::StationId => table_col(MEASUREMENTS_ALIAS, measurements::STN),
            Dimension::Name => table_col(STATIONS_ALIAS, stations::NAME),
            Dimension::Country => table_col(STATIONS_ALIAS, stations::COUNTRY),
            Dimension::State => table_col(STATIONS_ALIAS, stations::STATE),
        }
    }

    /// Projected item. Station id is renamed; the rest keep their column name.
    pub fn select_expr(&self) -> SelectExpr {
        let item = SelectExpr::new(self.column());
        match self {
            Dimension::StationId => item.with_alias("station_id"),
            _ => item,
        }
    }
}

/// Physical location of the two tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseSchema {
    /// Dotted path of the measurements table.
    pub measurements_table: String,
    /// Dotted path of the stations table.
    pub stations_table: String,
}

impl Default for WarehouseSchema {
    fn default() -> Self {
        Self {
            measurements_table: DEFAULT_MEASUREMENTS_TABLE.into(),
            stations_table: DEFAULT_STATIONS_TABLE.into(),
        }
    }
}

impl WarehouseSchema {
    pub fn new(measurements_table: &str, stations_table: &str) -> Self {
        Self {
            measurements_table: measurements_table.into(),
            stations_table: stations_table.into(),
        }
    }

    pub fn measurements_ref(&self) -> TableRef {
        TableRef::from_path(&self.measurements_table).with_alias(MEASUREMENTS_ALIAS)
    }

    pub fn stations_ref(&self) -> TableRef {
        TableRef::from_path(&self.stations_table).with_alias(STATIONS_ALIAS)
    }

    /// `m.stn = s.usaf AND m.wban = s.wban`
    pub fn join_condition(&self) -> Expr {
        table_col(MEASUREMENTS_ALIAS, measurements::STN)
            .eq(table_col(STATIONS_ALIAS, stations::USAF))
            .and(
                table_col(MEASUREMENTS_ALIAS, measurements::WBAN)
                    .eq(table_col(STATIONS_ALIAS, stations::WBAN)),
            )
    }
}
