//! Pipeline module - load, clean, aggregate and model the incident data

pub mod aggregate;
pub mod cleaner;
pub mod descriptive;
pub mod loader;
pub mod regression;
pub mod schema;

pub use aggregate::*;
pub use cleaner::*;
pub use descriptive::*;
pub use loader::*;
pub use regression::{
    derive_missing_indicator, fit_categorical, fit_missing_race_model, logistic, CoefficientRow,
    RegressionError, RegressionOptions, RegressionReport, INTERCEPT,
};
