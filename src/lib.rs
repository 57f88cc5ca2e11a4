//! shooting-eda: exploratory analysis of NYPD shooting incidents
//!
//! Loads the incident CSV, keeps the murders, aggregates them by month and
//! borough, and models whether the perpetrator's race went undocumented as a
//! function of the victim's race.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
