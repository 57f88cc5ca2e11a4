//! CLI module - argument parsing and run configuration

mod args;
mod config;

pub use args::Cli;
pub use config::AnalysisConfig;
