use gsod_query::compile::{compile, compile_raw, CompileOptions, CompiledQuery};
use gsod_query::config::Settings;
use gsod_query::request::RawRequest;
use gsod_query::schema::WarehouseSchema;
use gsod_query::sql::Dialect;
use gsod_query::validation::validate;

fn compile_default(raw: RawRequest) -> CompiledQuery {
    compile(&validate(&raw).unwrap(), &CompileOptions::default())
}

/// Every combination of location filters a caller can send.
fn filter_combinations() -> Vec<RawRequest> {
    let mut out = Vec::new();
    for country in [None, Some("US")] {
        for state in [None, Some("CA")] {
            for station in [None, Some("725030")] {
                let mut raw = RawRequest::new("2024-01-01", "2024-03-31", &["temp", "prcp", "wdsp"]);
                raw.country = country.map(String::from);
                raw.state = state.map(String::from);
                raw.station_id = station.map(String::from);
                out.push(raw);
            }
        }
    }
    out
}

#[test]
fn test_scenario_state_filter_no_aggregation() {
    let compiled = compile_default(
        RawRequest::new("2024-01-01", "2024-01-07", &["temp", "prcp"])
            .with_state("CA")
            .with_aggregation("none"),
    );

    assert!(compiled.uses_join);
    assert_eq!(
        compiled.expected_columns,
        vec!["date", "station_id", "name", "country", "state", "temp", "prcp"]
    );
    assert!(compiled.sql_text.contains("`s`.`state` = 'CA'"));
    assert!(!compiled.sql_text.contains("GROUP BY"));
    assert!(compiled.sql_text.contains("ORDER BY `m`.`date`"));
}

#[test]
fn test_scenario_unfiltered_full_year() {
    let compiled = compile_default(
        RawRequest::new("2024-01-01", "2024-12-31", &["temp"]).with_aggregation("none"),
    );

    assert!(!compiled.uses_join);
    assert_eq!(compiled.expected_columns, vec!["date", "temp"]);
    assert!(!compiled.sql_text.contains("GROUP BY"));
    assert!(!compiled.sql_text.contains("JOIN"));
}

#[test]
fn test_uses_join_iff_location_filter() {
    for raw in filter_combinations() {
        let has_filter = raw.country.is_some() || raw.state.is_some() || raw.station_id.is_some();
        for aggregation in ["none", "daily", "weekly", "monthly"] {
            let compiled = compile_default(raw.clone().with_aggregation(aggregation));
            assert_eq!(compiled.uses_join, has_filter);
            assert_eq!(compiled.sql_text.contains("INNER JOIN"), has_filter);
        }
    }
}

#[test]
fn test_expected_column_count() {
    // date + four station columns + three metrics when joined, date + metrics otherwise.
    for raw in filter_combinations() {
        let joined = raw.country.is_some() || raw.state.is_some() || raw.station_id.is_some();
        let expected = if joined { 8 } else { 4 };
        for aggregation in ["none", "daily", "weekly", "monthly"] {
            let compiled = compile_default(raw.clone().with_aggregation(aggregation));
            assert_eq!(compiled.expected_columns.len(), expected, "{}", compiled.sql_text);
            assert_eq!(compiled.query.select.len(), expected);
        }
    }
}

#[test]
fn test_no_aggregation_without_filters_reads_raw_rows() {
    let compiled = compile_default(RawRequest::new("2024-05-01", "2024-05-31", &["dewp", "slp"]));

    assert!(!compiled.uses_join);
    assert!(!compiled.sql_text.contains("GROUP BY"));
    assert!(compiled.sql_text.contains("`m`.`date`,"));
    assert!(compiled.sql_text.contains("`m`.`dewp`"));
    assert!(!compiled.sql_text.contains("AVG("));
}

#[test]
fn test_monthly_with_location_filters_aggregates() {
    let compiled = compile_default(
        RawRequest::new("2024-01-01", "2024-12-31", &["temp", "max"])
            .with_country("US")
            .with_state("TX")
            .with_aggregation("monthly")
            .with_metric_aggregation("max"),
    );

    assert!(compiled.uses_join);
    assert_eq!(
        compiled.expected_columns,
        vec!["date", "station_id", "name", "country", "state", "temp", "max"]
    );
    assert!(compiled
        .sql_text
        .contains("DATE_TRUNC(`m`.`date`, MONTH) AS `date`"));
    assert!(compiled.sql_text.contains("MAX(`m`.`temp`) AS `temp`"));
    assert!(compiled.sql_text.contains("MAX(`m`.`max`) AS `max`"));
    assert!(compiled.sql_text.contains(
        "GROUP BY DATE_TRUNC(`m`.`date`, MONTH), `m`.`stn`, `s`.`name`, `s`.`country`, `s`.`state`\n"
    ));
    assert!(compiled
        .sql_text
        .contains("ORDER BY DATE_TRUNC(`m`.`date`, MONTH)"));
}

#[test]
fn test_station_with_monthly_stays_per_row() {
    let compiled = compile_default(
        RawRequest::new("2024-01-01", "2024-12-31", &["temp"])
            .with_station("725030")
            .with_aggregation("monthly"),
    );

    assert!(compiled.uses_join);
    assert_eq!(
        compiled.expected_columns,
        vec!["date", "station_id", "name", "country", "state", "temp"]
    );
    assert!(!compiled.sql_text.contains("GROUP BY"));
    assert!(!compiled.sql_text.contains("DATE_TRUNC"));
    assert!(compiled.sql_text.contains("\n  `m`.`temp`\n"));
    assert!(compiled.sql_text.contains("`m`.`stn` = '725030'"));
}

#[test]
fn test_station_filter_uses_measurements_column() {
    let compiled = compile_default(
        RawRequest::new("2024-01-01", "2024-01-31", &["temp"]).with_station("725030"),
    );
    assert!(compiled.sql_text.contains("`m`.`stn` = '725030'"));
    assert!(!compiled.sql_text.contains("`s`.`usaf` = '725030'"));
}

#[test]
fn test_limit_always_applied() {
    for raw in filter_combinations() {
        for aggregation in ["none", "daily", "weekly", "monthly"] {
            let compiled = compile_default(raw.clone().with_aggregation(aggregation));
            assert!(compiled.sql_text.ends_with("\nLIMIT 10000"));
        }
    }
}

#[test]
fn test_weekly_dialects() {
    let request = validate(
        &RawRequest::new("2024-01-01", "2024-01-31", &["prcp"])
            .with_country("US")
            .with_aggregation("weekly"),
    )
    .unwrap();

    let bigquery = compile(&request, &CompileOptions::default());
    assert!(bigquery.sql_text.contains("DATE_TRUNC(`m`.`date`, WEEK)"));

    let postgres = compile(&request, &CompileOptions::default().with_dialect(Dialect::Postgres));
    insta::assert_snapshot!(postgres.sql_text, @r#"
    SELECT
      DATE_TRUNC('week', "m"."date") AS "date",
      "m"."stn" AS "station_id",
      "s"."name",
      "s"."country",
      "s"."state",
      AVG("m"."prcp") AS "prcp"
    FROM "bigquery-public-data"."noaa_gsod"."gsod2024" AS "m"
    INNER JOIN "bigquery-public-data"."noaa_gsod"."stations" AS "s" ON "m"."stn" = "s"."usaf" AND "m"."wban" = "s"."wban"
    WHERE "m"."date" >= DATE '2024-01-01' AND "m"."date" <= DATE '2024-01-31' AND "s"."country" = 'US'
    GROUP BY DATE_TRUNC('week', "m"."date"), "m"."stn", "s"."name", "s"."country", "s"."state"
    ORDER BY DATE_TRUNC('week', "m"."date")
    LIMIT 10000
    "#);

    let duckdb = compile(&request, &CompileOptions::default().with_dialect(Dialect::DuckDb));
    assert!(duckdb.sql_text.contains("DATE_TRUNC('week', \"m\".\"date\")"));
    assert_eq!(duckdb.expected_columns, postgres.expected_columns);
}

#[test]
fn test_daily_aggregation_groups_by_station() {
    let compiled = compile_default(
        RawRequest::new("2024-07-01", "2024-07-31", &["temp"])
            .with_state("AZ")
            .with_aggregation("daily")
            .with_metric_aggregation("min"),
    );

    assert_eq!(
        compiled.expected_columns,
        vec!["date", "station_id", "name", "country", "state", "temp"]
    );
    assert!(compiled.sql_text.contains("\n  `m`.`date`,\n"));
    assert!(compiled.sql_text.contains("MIN(`m`.`temp`) AS `temp`"));
    assert!(compiled.sql_text.contains(
        "GROUP BY `m`.`date`, `m`.`stn`, `s`.`name`, `s`.`country`, `s`.`state`\n"
    ));
}

#[test]
fn test_unfiltered_buckets_collapse_stations() {
    let compiled = compile_default(
        RawRequest::new("2024-01-01", "2024-12-31", &["temp"]).with_aggregation("monthly"),
    );

    assert!(!compiled.uses_join);
    assert_eq!(compiled.expected_columns, vec!["date", "temp"]);
    assert!(compiled
        .sql_text
        .contains("GROUP BY DATE_TRUNC(`m`.`date`, MONTH)\n"));
}

#[test]
fn test_max_rows_beyond_signed_range_is_capped() {
    let request = validate(&RawRequest::new("2024-01-01", "2024-01-31", &["temp"])).unwrap();
    let compiled = compile(&request, &CompileOptions::default().with_max_rows(u64::MAX));
    assert!(compiled.sql_text.ends_with("\nLIMIT 9223372036854775807"));
    assert!(!compiled.sql_text.contains("LIMIT -"));
}

#[test]
fn test_options_from_settings() {
    let settings = Settings::from_toml_str(
        r#"
[warehouse]
dialect = "duckdb"
measurements_table = "gsod"
stations_table = "stations"

[query]
max_rows = 100
"#,
    )
    .unwrap();
    let options = CompileOptions::from_settings(&settings);

    assert_eq!(options.dialect, Dialect::DuckDb);
    assert_eq!(options.schema, WarehouseSchema::new("gsod", "stations"));
    assert_eq!(options.max_rows, 100);

    let request = validate(&RawRequest::new("2024-01-01", "2024-01-31", &["temp"]).with_state("CA"))
        .unwrap();
    let compiled = compile(&request, &options);
    assert!(compiled.sql_text.contains("FROM \"gsod\" AS \"m\""));
    assert!(compiled.sql_text.contains("INNER JOIN \"stations\" AS \"s\""));
    assert!(compiled.sql_text.ends_with("LIMIT 100"));
}

#[test]
fn test_compile_is_deterministic() {
    let raw = RawRequest::new("2024-01-01", "2024-06-30", &["temp", "sndp"])
        .with_country("CA")
        .with_aggregation("monthly");
    let first = compile_raw(&raw, &CompileOptions::default()).unwrap();
    let second = compile_raw(&raw, &CompileOptions::default()).unwrap();
    assert_eq!(first.sql_text, second.sql_text);
    assert_eq!(first.expected_columns, second.expected_columns);
}
