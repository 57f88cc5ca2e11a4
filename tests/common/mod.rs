//! Shared test utilities and fixture generators
#![allow(dead_code)]

use polars::prelude::*;
use shooting_eda::pipeline::parse_csv;
use std::path::PathBuf;
use tempfile::TempDir;

/// Header of the published incident CSV
pub const HEADER: [&str; 21] = [
    "INCIDENT_KEY",
    "OCCUR_DATE",
    "OCCUR_TIME",
    "BORO",
    "LOC_OF_OCCUR_DESC",
    "PRECINCT",
    "JURISDICTION_CODE",
    "LOC_CLASSFCTN_DESC",
    "LOCATION_DESC",
    "STATISTICAL_MURDER_FLAG",
    "PERP_AGE_GROUP",
    "PERP_SEX",
    "PERP_RACE",
    "VIC_AGE_GROUP",
    "VIC_SEX",
    "VIC_RACE",
    "X_COORD_CD",
    "Y_COORD_CD",
    "Latitude",
    "Longitude",
    "Lon_Lat",
];

/// One incident row; everything not listed here gets a fixed plausible value
#[derive(Debug, Clone)]
pub struct Incident {
    pub date: String,
    pub boro: String,
    pub murder_flag: String,
    pub perp_race: String,
    pub vic_race: String,
    pub vic_age: String,
    pub location_desc: String,
}

impl Incident {
    pub fn new(date: &str, boro: &str, murder_flag: &str) -> Self {
        Self {
            date: date.to_string(),
            boro: boro.to_string(),
            murder_flag: murder_flag.to_string(),
            perp_race: "BLACK".to_string(),
            vic_race: "BLACK".to_string(),
            vic_age: "25-44".to_string(),
            location_desc: "STREET".to_string(),
        }
    }

    pub fn perp_race(mut self, race: &str) -> Self {
        self.perp_race = race.to_string();
        self
    }

    pub fn vic_race(mut self, race: &str) -> Self {
        self.vic_race = race.to_string();
        self
    }

    pub fn vic_age(mut self, age: &str) -> Self {
        self.vic_age = age.to_string();
        self
    }

    pub fn location_desc(mut self, desc: &str) -> Self {
        self.location_desc = desc.to_string();
        self
    }

    fn to_csv_line(&self, key: usize) -> String {
        [
            key.to_string(),
            self.date.clone(),
            "21:30:00".to_string(),
            self.boro.clone(),
            "OUTSIDE".to_string(),
            "44".to_string(),
            "0".to_string(),
            "STREET".to_string(),
            self.location_desc.clone(),
            self.murder_flag.clone(),
            "25-44".to_string(),
            "M".to_string(),
            self.perp_race.clone(),
            self.vic_age.clone(),
            "M".to_string(),
            self.vic_race.clone(),
            "1006343".to_string(),
            "234270".to_string(),
            "40.8".to_string(),
            "-73.9".to_string(),
            "POINT (-73.9 40.8)".to_string(),
        ]
        .join(",")
    }
}

/// Render incidents as the published CSV text
pub fn incidents_csv(incidents: &[Incident]) -> String {
    let mut out = HEADER.join(",");
    out.push('\n');
    for (key, incident) in incidents.iter().enumerate() {
        out.push_str(&incident.to_csv_line(228_798_000 + key));
        out.push('\n');
    }
    out
}

/// Incidents parsed the same way a download would be
pub fn incidents_dataframe(incidents: &[Incident]) -> DataFrame {
    parse_csv(incidents_csv(incidents).into_bytes()).unwrap()
}

/// Create a temporary directory holding the incidents as a CSV file
pub fn create_temp_incidents_csv(incidents: &[Incident]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("incidents.csv");
    std::fs::write(&csv_path, incidents_csv(incidents)).unwrap();
    (temp_dir, csv_path)
}

/// Murders whose perpetrator race is undocumented at a known rate per victim race:
/// WHITE 3/10, BLACK 12/20, ASIAN / PACIFIC ISLANDER 2/8.
pub fn regression_fixture() -> Vec<Incident> {
    let groups = [
        ("WHITE", 10, 3, "BROOKLYN"),
        ("BLACK", 20, 12, "BRONX"),
        ("ASIAN / PACIFIC ISLANDER", 8, 2, "QUEENS"),
    ];

    let mut incidents = Vec::new();
    for (race, murders, missing, boro) in groups {
        for i in 0..murders {
            let perp = if i < missing { "(null)" } else { "WHITE HISPANIC" };
            let month = i % 12 + 1;
            incidents.push(
                Incident::new(&format!("{:02}/15/2021", month), boro, "true")
                    .vic_race(race)
                    .perp_race(perp),
            );
        }
    }

    // Non-murders never reach the model
    incidents.push(Incident::new("03/02/2021", "BRONX", "false").vic_race("WHITE").perp_race(""));
    incidents.push(Incident::new("04/02/2021", "BRONX", "FALSE").vic_race("BLACK"));
    incidents
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// String values of a column, with nulls as None
pub fn string_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect()
}
