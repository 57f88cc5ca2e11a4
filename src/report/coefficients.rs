//! Logistic regression coefficient report

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{CoefficientRow, RegressionReport};
use crate::utils::{print_indented, print_section};

/// Significance level used to colour and describe contrasts
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Print the coefficient table followed by a plain-language reading
pub fn display_coefficients(report: &RegressionReport) {
    print_section(
        "🧮",
        &format!(
            "LOGIT: {} ~ {} (baseline {})",
            report.response, report.predictor, report.reference
        ),
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Term").add_attribute(Attribute::Bold),
        Cell::new("Estimate").add_attribute(Attribute::Bold),
        Cell::new("Std. Error").add_attribute(Attribute::Bold),
        Cell::new("z").add_attribute(Attribute::Bold),
        Cell::new("p").add_attribute(Attribute::Bold),
        Cell::new("Odds Ratio").add_attribute(Attribute::Bold),
        Cell::new("95% CI (OR)").add_attribute(Attribute::Bold),
        Cell::new("P(missing)").add_attribute(Attribute::Bold),
    ]);

    for row in &report.coefficients {
        let p_color = if row.is_intercept() {
            Color::White
        } else if row.is_significant(SIGNIFICANCE_LEVEL) {
            Color::Green
        } else {
            Color::DarkGrey
        };

        table.add_row(vec![
            Cell::new(&row.term),
            Cell::new(format!("{:.4}", row.estimate)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", row.std_error)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", row.z_value)).set_alignment(CellAlignment::Right),
            Cell::new(format_p_value(row.p_value))
                .fg(p_color)
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", row.odds_ratio)).set_alignment(CellAlignment::Right),
            Cell::new(format!(
                "[{:.3}, {:.3}]",
                row.odds_ratio_lower, row.odds_ratio_upper
            )),
            Cell::new(format!("{:.1}%", row.predicted_probability * 100.0))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table.to_string());

    println!(
        "      {}",
        style(format!(
            "n = {}, IRLS iterations = {}, deviance = {:.2} (null {:.2}), AIC = {:.2}",
            report.observations,
            report.iterations,
            report.deviance,
            report.null_deviance,
            report.aic
        ))
        .dim()
    );
    if report.dropped_incomplete > 0 {
        println!(
            "      {}",
            style(format!(
                "{} rows without {} were excluded",
                report.dropped_incomplete, report.predictor
            ))
            .dim()
        );
    }

    println!();
    for line in interpretation(report) {
        println!("      {} {}", style("•").cyan(), line);
    }
}

/// Plain-language reading of each coefficient relative to the baseline
pub fn interpretation(report: &RegressionReport) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(intercept) = report.intercept() {
        lines.push(format!(
            "Murders of {} victims have a {:.1}% predicted chance of an undocumented perpetrator race.",
            report.reference,
            intercept.predicted_probability * 100.0
        ));
    }

    for row in report.contrasts() {
        lines.push(describe_contrast(row, &report.reference));
    }

    lines
}

fn describe_contrast(row: &CoefficientRow, reference: &str) -> String {
    let direction = if row.odds_ratio >= 1.0 {
        format!("{:.2}x the odds", row.odds_ratio)
    } else {
        format!("{:.0}% lower odds", (1.0 - row.odds_ratio) * 100.0)
    };
    let verdict = if row.is_significant(SIGNIFICANCE_LEVEL) {
        "significant"
    } else {
        "not significant"
    };

    format!(
        "{} victims: {} vs {} (95% CI {:.2}-{:.2}, p {}, {}); predicted {:.1}%.",
        row.term,
        direction,
        reference,
        row.odds_ratio_lower,
        row.odds_ratio_upper,
        format_p_value(row.p_value),
        verdict,
        row.predicted_probability * 100.0
    )
}

/// p-values below display precision are shown as a bound
pub fn format_p_value(p: f64) -> String {
    if p < 1e-4 {
        "< 0.0001".to_string()
    } else {
        format!("{:.4}", p)
    }
}
