use gsod_query::request::{Aggregation, Metric, MetricAggregation, RawRequest};
use gsod_query::validation::{self, ValidationError};

fn base() -> RawRequest {
    RawRequest::new("2024-01-01", "2024-01-07", &["temp", "prcp"])
}

#[test]
fn test_validate_full_request() {
    let raw = RawRequest::new("2024-03-01", "2024-03-31", &["Temp", "MAX", "sndp"])
        .with_country("us")
        .with_state("ny")
        .with_aggregation("Weekly")
        .with_metric_aggregation("MIN");

    let request = validation::validate(&raw).unwrap();

    assert_eq!(request.start_date().to_string(), "2024-03-01");
    assert_eq!(request.end_date().to_string(), "2024-03-31");
    assert_eq!(request.metrics(), &[Metric::Temp, Metric::Max, Metric::Sndp]);
    assert_eq!(request.country(), Some("US"));
    assert_eq!(request.state(), Some("NY"));
    assert_eq!(request.station_id(), None);
    assert_eq!(request.aggregation(), Aggregation::Weekly);
    assert_eq!(request.metric_aggregation(), MetricAggregation::Min);
}

#[test]
fn test_every_allow_listed_metric_is_accepted() {
    for metric in Metric::ALL {
        let raw = RawRequest::new("2024-01-01", "2024-01-02", &[metric.column()]);
        let request = validation::validate(&raw).unwrap();
        assert_eq!(request.metrics(), &[metric]);
    }
}

#[test]
fn test_invalid_metric_names_the_metric() {
    for bad in ["humidity", "visib", "gust", "temperature", ""] {
        let mut raw = base();
        raw.metrics.push(bad.to_string());

        let err = validation::validate(&raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidMetric {
                metric: bad.to_string()
            }
        );
        let message = err.to_string();
        assert!(message.contains(&format!("'{}'", bad)));
        assert!(message.contains("temp, max, min, prcp, wdsp, dewp, slp, sndp"));
    }
}

#[test]
fn test_no_metrics() {
    let raw = RawRequest::new("2024-01-01", "2024-01-07", &[]);
    assert_eq!(validation::validate(&raw), Err(ValidationError::NoMetrics));
}

#[test]
fn test_aggregation_values() {
    for (input, expected) in [
        ("none", Aggregation::None),
        ("DAILY", Aggregation::Daily),
        ("weekly", Aggregation::Weekly),
        ("Monthly", Aggregation::Monthly),
    ] {
        let request = validation::validate(&base().with_aggregation(input)).unwrap();
        assert_eq!(request.aggregation(), expected);
    }

    let err = validation::validate(&base().with_aggregation("yearly")).unwrap_err();
    assert!(err.to_string().contains("yearly"));
}

#[test]
fn test_metric_aggregation_fallback() {
    for input in ["median", "sum", "", "average"] {
        let request = validation::validate(&base().with_metric_aggregation(input)).unwrap();
        assert_eq!(request.metric_aggregation(), MetricAggregation::Avg);
    }
}

#[test]
fn test_date_errors() {
    let raw = RawRequest::new("01/01/2024", "2024-01-07", &["temp"]);
    assert!(matches!(
        validation::validate(&raw),
        Err(ValidationError::InvalidDate {
            field: "start_date",
            ..
        })
    ));

    let raw = RawRequest::new("2024-01-01", "2024-13-01", &["temp"]);
    assert!(matches!(
        validation::validate(&raw),
        Err(ValidationError::InvalidDate {
            field: "end_date",
            ..
        })
    ));

    let raw = RawRequest::new("2024-01-07", "2024-01-01", &["temp"]);
    let err = validation::validate(&raw).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidDateRange { .. }));
    assert!(err.to_string().contains("2024-01-01"));
}

#[test]
fn test_unsafe_literals_rejected() {
    let injections = [
        "US' OR '1'='1",
        "CA\"",
        "725030`",
        "72\\5030",
        "CA\u{0}",
        "C\tA",
    ];
    for value in injections {
        for raw in [
            base().with_country(value),
            base().with_state(value),
            base().with_station(value),
        ] {
            assert!(
                matches!(
                    validation::validate(&raw),
                    Err(ValidationError::UnsafeLiteral { .. })
                ),
                "{value:?} should be rejected"
            );
        }
    }
}

#[test]
fn test_non_ascii_station_names_are_not_unsafe() {
    let request = validation::validate(&base().with_station("A1B2-ü")).unwrap();
    assert_eq!(request.station_id(), Some("A1B2-ü"));
}

#[test]
fn test_raw_request_from_json() {
    let json = r#"{
        "start_date": "2024-01-01",
        "end_date": "2024-01-07",
        "metrics": ["temp", "prcp"],
        "state": "CA",
        "aggregation": "none",
        "output_filename": "ca_weather.csv"
    }"#;
    let raw: RawRequest = serde_json::from_str(json).unwrap();
    let request = validation::validate(&raw).unwrap();

    assert!(request.has_location_filter());
    assert_eq!(request.state(), Some("CA"));
}
