//! Tests for the undocumented-perpetrator-race logistic regression

use polars::prelude::*;
use shooting_eda::pipeline::schema::PERP_RACE_MISSING;
use shooting_eda::pipeline::{
    clean, derive_missing_indicator, fit_categorical, fit_missing_race_model, logistic,
    RegressionError, RegressionOptions, RegressionReport, INTERCEPT,
};

#[path = "common/mod.rs"]
mod common;

use common::{incidents_dataframe, regression_fixture, Incident};

const EPS: f64 = 1e-6;

fn fit_fixture(options: &RegressionOptions) -> RegressionReport {
    let cleaned = clean(&incidents_dataframe(&regression_fixture())).unwrap();
    fit_missing_race_model(&cleaned.data, options).unwrap()
}

fn term<'a>(report: &'a RegressionReport, name: &str) -> &'a shooting_eda::pipeline::CoefficientRow {
    report
        .coefficients
        .iter()
        .find(|row| row.term == name)
        .unwrap_or_else(|| panic!("term '{}' missing", name))
}

#[test]
fn test_missing_indicator_marks_imputed_perp_race() {
    let cleaned = clean(&incidents_dataframe(&regression_fixture())).unwrap();
    let with_indicator = derive_missing_indicator(&cleaned.data).unwrap();

    let flags = with_indicator
        .column(PERP_RACE_MISSING)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap();
    let flags: Vec<i64> = flags.i64().unwrap().into_no_null_iter().collect();

    assert_eq!(flags.len(), 38);
    assert_eq!(flags.iter().sum::<i64>(), 17);
    assert!(flags.iter().all(|&f| f == 0 || f == 1));
}

#[test]
fn test_both_missing_encodings_flag_missing_perp_race() {
    let cleaned = clean(&incidents_dataframe(&[
        Incident::new("03/01/2020", "BRONX", "true").perp_race(""),
        Incident::new("03/02/2020", "BRONX", "true").perp_race("(null)"),
        Incident::new("03/03/2020", "BRONX", "true").perp_race("UNKNOWN"),
    ]))
    .unwrap();
    let with_indicator = derive_missing_indicator(&cleaned.data).unwrap();

    let flags = with_indicator
        .column(PERP_RACE_MISSING)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap();
    let flags: Vec<i64> = flags.i64().unwrap().into_no_null_iter().collect();
    assert_eq!(flags, vec![1, 1, 0], "UNKNOWN is a recorded value, not a missing one");
}

#[test]
fn test_terms_follow_reference_then_sorted_levels() {
    let report = fit_fixture(&RegressionOptions::default());
    let terms: Vec<&str> = report.coefficients.iter().map(|r| r.term.as_str()).collect();

    assert_eq!(terms, vec![INTERCEPT, "ASIAN / PACIFIC ISLANDER", "BLACK"]);
    assert_eq!(report.reference, "WHITE");
    assert_eq!(report.observations, 38);
    assert_eq!(report.levels[0].level, "WHITE");
}

#[test]
fn test_saturated_model_recovers_group_log_odds() {
    let report = fit_fixture(&RegressionOptions::default());

    let intercept = report.intercept().unwrap();
    assert!((intercept.estimate - (3.0f64 / 7.0).ln()).abs() < EPS);

    let black = term(&report, "BLACK");
    assert!((black.estimate - ((12.0f64 / 8.0).ln() - (3.0f64 / 7.0).ln())).abs() < EPS);
    assert!((black.odds_ratio - 3.5).abs() < 1e-5);

    let expected_se = (1.0 / 12.0 + 1.0 / 8.0 + 1.0 / 3.0 + 1.0 / 7.0f64).sqrt();
    assert!((black.std_error - expected_se).abs() < 1e-5);

    let asian = term(&report, "ASIAN / PACIFIC ISLANDER");
    assert!((asian.odds_ratio - 7.0 / 9.0).abs() < 1e-5);
}

#[test]
fn test_predicted_probabilities_add_intercept() {
    let report = fit_fixture(&RegressionOptions::default());
    let intercept = report.intercept().unwrap();

    assert!((intercept.predicted_probability - 0.3).abs() < EPS);
    assert!((intercept.predicted_probability - logistic(intercept.estimate)).abs() < 1e-12);

    for row in report.contrasts() {
        let expected = logistic(intercept.estimate + row.estimate);
        assert!((row.predicted_probability - expected).abs() < 1e-12);
    }
    assert!((term(&report, "BLACK").predicted_probability - 0.6).abs() < EPS);
    assert!((term(&report, "ASIAN / PACIFIC ISLANDER").predicted_probability - 0.25).abs() < EPS);
}

#[test]
fn test_wald_interval_and_odds_ratio_relations() {
    let report = fit_fixture(&RegressionOptions::default());

    for row in &report.coefficients {
        assert!((row.ci_lower - (row.estimate - 1.96 * row.std_error)).abs() < 1e-12);
        assert!((row.ci_upper - (row.estimate + 1.96 * row.std_error)).abs() < 1e-12);
        assert!((row.odds_ratio - row.estimate.exp()).abs() < 1e-12);
        assert!(row.odds_ratio_lower <= row.odds_ratio && row.odds_ratio <= row.odds_ratio_upper);
        assert!((0.0..=1.0).contains(&row.p_value));
    }
}

#[test]
fn test_reference_category_is_configurable() {
    let options = RegressionOptions {
        reference: "BLACK".to_string(),
        ..RegressionOptions::default()
    };
    let report = fit_fixture(&options);
    let terms: Vec<&str> = report.coefficients.iter().map(|r| r.term.as_str()).collect();

    assert_eq!(terms, vec![INTERCEPT, "ASIAN / PACIFIC ISLANDER", "WHITE"]);
    assert!((report.intercept().unwrap().predicted_probability - 0.6).abs() < EPS);
    assert!((term(&report, "WHITE").odds_ratio - 1.0 / 3.5).abs() < 1e-5);
}

#[test]
fn test_missing_reference_is_an_error() {
    let cleaned = clean(&incidents_dataframe(&regression_fixture())).unwrap();
    let options = RegressionOptions {
        reference: "AMERICAN INDIAN/ALASKAN NATIVE".to_string(),
        ..RegressionOptions::default()
    };

    let err = fit_missing_race_model(&cleaned.data, &options).unwrap_err();
    assert!(matches!(err, RegressionError::MissingReference { .. }));
    assert!(err.is_degenerate());
}

#[test]
fn test_perfect_separation_is_an_error() {
    let mut incidents = regression_fixture();
    for _ in 0..3 {
        incidents.push(
            Incident::new("06/01/2021", "MANHATTAN", "true")
                .vic_race("BLACK HISPANIC")
                .perp_race("(null)"),
        );
    }
    let cleaned = clean(&incidents_dataframe(&incidents)).unwrap();

    let err = fit_missing_race_model(&cleaned.data, &RegressionOptions::default()).unwrap_err();
    match err {
        RegressionError::PerfectSeparation { level, events, rows } => {
            assert_eq!(level, "BLACK HISPANIC");
            assert_eq!(events, 3);
            assert_eq!(rows, 3);
        }
        other => panic!("expected perfect separation, got {other:?}"),
    }
}

#[test]
fn test_no_events_anywhere_is_an_error() {
    let values = ["WHITE", "WHITE", "BLACK", "BLACK"];
    let outcome = [0.0, 0.0, 0.0, 0.0];

    let err = fit_categorical(
        "VIC_RACE",
        &values,
        PERP_RACE_MISSING,
        &outcome,
        &RegressionOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_degenerate());
}

#[test]
fn test_single_level_is_an_error() {
    let values = ["WHITE", "WHITE", "WHITE"];
    let outcome = [0.0, 1.0, 0.0];

    let err = fit_categorical(
        "VIC_RACE",
        &values,
        PERP_RACE_MISSING,
        &outcome,
        &RegressionOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RegressionError::SingleLevel { .. }));
}

#[test]
fn test_empty_input_is_an_error() {
    let err = fit_categorical(
        "VIC_RACE",
        &[],
        PERP_RACE_MISSING,
        &[],
        &RegressionOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RegressionError::EmptyInput));
}

#[test]
fn test_coefficient_dataframe_has_one_row_per_term() {
    let report = fit_fixture(&RegressionOptions::default());
    let df = report.to_dataframe().unwrap();

    assert_eq!(df.height(), report.coefficients.len());
    for name in [
        "term",
        "estimate",
        "odds_ratio",
        "std_error",
        "z_value",
        "p_value",
        "ci_lower",
        "ci_upper",
        "odds_ratio_lower",
        "odds_ratio_upper",
        "predicted_probability",
    ] {
        assert!(df.get_column_index(name).is_some(), "missing column '{}'", name);
    }

    let lower: Vec<f64> = df
        .column("odds_ratio_lower")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    let expected: Vec<f64> = report.coefficients.iter().map(|r| r.odds_ratio_lower).collect();
    assert_eq!(lower, expected);
}
