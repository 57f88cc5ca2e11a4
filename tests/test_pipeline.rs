//! End-to-end tests running the analysis steps on a local CSV

use shooting_eda::cli::{AnalysisConfig, Cli};
use shooting_eda::pipeline::{
    aggregate_murder_counts, clean, describe, fit_missing_race_model, load_dataset,
    monthly_counts, total_count, validate_schema, DataSource,
};
use shooting_eda::report::{borough_trends, export_analysis, interpretation, AnalysisExport};
use clap::Parser;

#[path = "common/mod.rs"]
mod common;

use common::{create_temp_incidents_csv, regression_fixture};

#[test]
fn test_full_pipeline_from_csv() {
    let (dir, path) = create_temp_incidents_csv(&regression_fixture());

    let raw = load_dataset(&DataSource::File(path.clone())).unwrap();
    validate_schema(&raw).unwrap();
    let cleaned = clean(&raw).unwrap();
    assert_eq!(cleaned.data.height(), 38);
    assert_eq!(cleaned.dropped_unparsed_dates, 0);

    let stats = describe(&raw, &cleaned).unwrap();
    assert_eq!(stats.total_incidents, 40);
    assert_eq!(stats.murders, 38);

    let counts_df = aggregate_murder_counts(&cleaned.data).unwrap();
    assert_eq!(total_count(&counts_df).unwrap(), 38);
    let counts = monthly_counts(&counts_df).unwrap();

    let trends = borough_trends(&counts);
    let boroughs: Vec<&str> = trends.iter().map(|t| t.borough.as_str()).collect();
    assert_eq!(boroughs, vec!["BRONX", "BROOKLYN", "QUEENS"]);
    assert_eq!(trends.iter().map(|t| t.total).sum::<u64>(), 38);

    let cli = Cli::parse_from([
        "shooting-eda",
        "-i",
        path.to_str().unwrap(),
        "--no-charts",
    ]);
    let config = AnalysisConfig::from_cli(&cli);
    let model = fit_missing_race_model(&cleaned.data, &config.regression).unwrap();
    assert_eq!(interpretation(&model).len(), model.coefficients.len());

    let export_path = dir.path().join("analysis.json");
    let export = AnalysisExport::new(&config, &stats, &counts, &model);
    export_analysis(&export, &export_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(json["metadata"]["config"]["source"]["kind"], "file");
    assert_eq!(json["metadata"]["config"]["regression"]["reference"], "WHITE");
    assert_eq!(json["descriptive"]["murders"], 38);
    assert_eq!(
        json["murder_counts"].as_array().unwrap().len(),
        counts.len()
    );
    assert_eq!(json["regression"]["coefficients"][0]["term"], "(Intercept)");
    assert_eq!(json["murder_counts"][0]["month_year"], "2021-01-01");
}

#[test]
fn test_missing_share_matches_model_input() {
    let (_dir, path) = create_temp_incidents_csv(&regression_fixture());
    let raw = load_dataset(&DataSource::File(path)).unwrap();
    let cleaned = clean(&raw).unwrap();
    let stats = describe(&raw, &cleaned).unwrap();

    let model = fit_missing_race_model(&cleaned.data, &Default::default()).unwrap();
    for level in &model.levels {
        let share = stats
            .missing_perp_race
            .iter()
            .find(|s| s.victim_race == level.level)
            .unwrap();
        assert_eq!(share.murders, level.rows);
        assert_eq!(share.perp_race_missing, level.events);
    }
}
