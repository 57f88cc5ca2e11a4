//! Run summary report generation

use std::path::PathBuf;
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::utils::print_indented;

/// Row counts and timings collected while the pipeline runs
#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub raw_rows: usize,
    pub raw_columns: usize,
    pub cleaned_rows: usize,
    pub cleaned_columns: usize,
    pub dropped_unparsed_dates: usize,
    pub aggregate_groups: usize,
    pub regression_observations: usize,
    pub charts_written: Vec<PathBuf>,
    pub export_path: Option<PathBuf>,
    load_time: Option<Duration>,
    clean_time: Option<Duration>,
    analysis_time: Option<Duration>,
    regression_time: Option<Duration>,
    chart_time: Option<Duration>,
}

impl AnalysisSummary {
    pub fn new(raw_rows: usize, raw_columns: usize) -> Self {
        Self {
            raw_rows,
            raw_columns,
            ..Default::default()
        }
    }

    pub fn set_cleaned(&mut self, rows: usize, columns: usize, dropped_unparsed_dates: usize) {
        self.cleaned_rows = rows;
        self.cleaned_columns = columns;
        self.dropped_unparsed_dates = dropped_unparsed_dates;
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = Some(elapsed);
    }

    pub fn set_clean_time(&mut self, elapsed: Duration) {
        self.clean_time = Some(elapsed);
    }

    pub fn set_analysis_time(&mut self, elapsed: Duration) {
        self.analysis_time = Some(elapsed);
    }

    pub fn set_regression_time(&mut self, elapsed: Duration) {
        self.regression_time = Some(elapsed);
    }

    pub fn set_chart_time(&mut self, elapsed: Duration) {
        self.chart_time = Some(elapsed);
    }

    /// Sum of all recorded step timings
    pub fn total_time(&self) -> Duration {
        [
            self.load_time,
            self.clean_time,
            self.analysis_time,
            self.regression_time,
            self.chart_time,
        ]
        .iter()
        .flatten()
        .sum()
    }

    /// Percentage of raw incidents kept in the cleaned murder table
    pub fn retention_pct(&self) -> f64 {
        if self.raw_rows > 0 {
            self.cleaned_rows as f64 / self.raw_rows as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Raw incidents"),
            Cell::new(format!("{} × {} columns", self.raw_rows, self.raw_columns)),
        ]);
        table.add_row(vec![
            Cell::new("🔎 Cleaned murders"),
            Cell::new(format!(
                "{} × {} columns ({:.1}%)",
                self.cleaned_rows,
                self.cleaned_columns,
                self.retention_pct()
            ))
            .fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("📅 Dropped (bad OCCUR_DATE)"),
            Cell::new(self.dropped_unparsed_dates).fg(if self.dropped_unparsed_dates == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![
            Cell::new("🗓️  Month × borough groups"),
            Cell::new(self.aggregate_groups),
        ]);
        table.add_row(vec![
            Cell::new("📈 Regression observations"),
            Cell::new(self.regression_observations),
        ]);
        table.add_row(vec![
            Cell::new("🖼️  Charts written"),
            Cell::new(self.charts_written.len()),
        ]);
        if let Some(path) = &self.export_path {
            table.add_row(vec![
                Cell::new("💾 Export"),
                Cell::new(path.display().to_string()),
            ]);
        }
        table.add_row(vec![
            Cell::new("⏱  Total time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64()))
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
        ]);

        print_indented(&table.to_string());

        if !self.charts_written.is_empty() {
            println!();
            for chart in &self.charts_written {
                println!("      {} {}", style("•").dim(), chart.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_time_sums_recorded_steps() {
        let mut summary = AnalysisSummary::new(100, 21);
        summary.set_load_time(Duration::from_millis(1500));
        summary.set_regression_time(Duration::from_millis(250));
        assert_eq!(summary.total_time(), Duration::from_millis(1750));
    }

    #[test]
    fn test_retention_pct() {
        let mut summary = AnalysisSummary::new(200, 21);
        summary.set_cleaned(40, 14, 0);
        assert!((summary.retention_pct() - 20.0).abs() < 1e-12);

        assert_eq!(AnalysisSummary::new(0, 0).retention_pct(), 0.0);
    }
}
