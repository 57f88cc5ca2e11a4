//! PNG charts rendered with plotters

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use tracing::info;

use super::tables::age_group_rank;
use crate::pipeline::{AgeRaceCount, CoefficientRow, MonthlyCount, RegressionReport};

pub const MONTHLY_CHART: &str = "monthly_murders_by_borough.png";
pub const AGE_RACE_CHART: &str = "victim_age_by_race.png";
pub const COEFFICIENT_CHART: &str = "coefficient_plot.png";

const CANVAS: (u32, u32) = (1600, 1000);
const TITLE_FONT: (&str, u32) = ("sans-serif", 32);
const PANEL_FONT: (&str, u32) = ("sans-serif", 20);

/// Render the three charts into `dir`, creating it if needed
pub fn render_all(
    dir: &Path,
    counts: &[MonthlyCount],
    age_by_race: &[AgeRaceCount],
    report: &RegressionReport,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory {}", dir.display()))?;

    let monthly = dir.join(MONTHLY_CHART);
    render_monthly_murders(&monthly, counts)?;

    let ages = dir.join(AGE_RACE_CHART);
    render_victim_age_by_race(&ages, age_by_race)?;

    let coefficients = dir.join(COEFFICIENT_CHART);
    render_coefficient_plot(&coefficients, report)?;

    Ok(vec![monthly, ages, coefficients])
}

/// Rows and columns of a facet grid holding `panels` panels
pub fn facet_grid(panels: usize) -> (usize, usize) {
    if panels == 0 {
        return (1, 1);
    }
    let cols = (panels as f64).sqrt().ceil() as usize;
    let rows = panels.div_ceil(cols);
    (rows, cols)
}

/// Month start as a fractional year, January 2020 is 2020.0
pub fn fractional_year(date: NaiveDate) -> f64 {
    date.year() as f64 + date.month0() as f64 / 12.0
}

/// Monthly series per borough as (fractional year, count), in date order
pub fn borough_series(counts: &[MonthlyCount]) -> BTreeMap<String, Vec<(f64, f64)>> {
    let mut series: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
    for row in counts {
        series
            .entry(row.borough.clone())
            .or_default()
            .push((fractional_year(row.month_year), row.count as f64));
    }
    for points in series.values_mut() {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    series
}

/// Age groups in display order and, per race, the count for each of them
pub fn age_bars(rows: &[AgeRaceCount]) -> (Vec<String>, BTreeMap<String, Vec<usize>>) {
    let mut ages: Vec<String> = rows.iter().map(|r| r.victim_age_group.clone()).collect();
    ages.sort_by_key(|a| age_group_rank(a));
    ages.dedup();

    let mut bars: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for row in rows {
        let slot = bars
            .entry(row.victim_race.clone())
            .or_insert_with(|| vec![0; ages.len()]);
        if let Some(idx) = ages.iter().position(|a| *a == row.victim_age_group) {
            slot[idx] += row.count;
        }
    }
    (ages, bars)
}

/// Log-axis range covering every interval and the no-effect line at 1
pub fn odds_ratio_range(rows: &[&CoefficientRow]) -> Option<(f64, f64)> {
    let bounds: Vec<f64> = rows
        .iter()
        .flat_map(|r| [r.odds_ratio_lower, r.odds_ratio_upper])
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if bounds.is_empty() {
        return None;
    }
    let lo = bounds.iter().copied().fold(1.0_f64, f64::min);
    let hi = bounds.iter().copied().fold(1.0_f64, f64::max);
    Some((lo / 1.25, hi * 1.25))
}

pub fn render_monthly_murders(path: &Path, counts: &[MonthlyCount]) -> Result<()> {
    let series = borough_series(counts);
    if series.is_empty() {
        bail!("No murder counts to plot");
    }

    let xs = series.values().flatten().map(|p| p.0);
    let x_min = xs.clone().fold(f64::INFINITY, f64::min);
    let mut x_max = xs.fold(f64::NEG_INFINITY, f64::max);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    let y_max = series
        .values()
        .flatten()
        .map(|p| p.1)
        .fold(1.0_f64, f64::max)
        * 1.1;

    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Monthly murders by borough", TITLE_FONT)?;

    let panels = root.split_evenly(facet_grid(series.len()));
    for (idx, ((borough, points), panel)) in series.iter().zip(panels.iter()).enumerate() {
        let mut chart = ChartBuilder::on(panel)
            .caption(borough, PANEL_FONT)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(45)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_desc("Murders")
            .draw()?;

        chart.draw_series(LineSeries::new(
            points.iter().copied(),
            Palette99::pick(idx).stroke_width(2),
        ))?;
    }

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), boroughs = series.len(), "monthly chart saved");
    Ok(())
}

pub fn render_victim_age_by_race(path: &Path, rows: &[AgeRaceCount]) -> Result<()> {
    let (ages, bars) = age_bars(rows);
    if bars.is_empty() {
        bail!("No victim age groups to plot");
    }

    let y_max = bars
        .values()
        .flatten()
        .copied()
        .max()
        .unwrap_or(1)
        .max(1) as f64
        * 1.1;
    let x_range = -0.5..(ages.len() as f64 - 0.5);
    let age_label = |x: &f64| {
        let nearest = x.round();
        if (x - nearest).abs() < 1e-6 && nearest >= 0.0 {
            ages.get(nearest as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };

    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Victim age group by victim race (murders)", TITLE_FONT)?;

    let panels = root.split_evenly(facet_grid(bars.len()));
    for (idx, ((race, counts), panel)) in bars.iter().zip(panels.iter()).enumerate() {
        let mut chart = ChartBuilder::on(panel)
            .caption(race, PANEL_FONT)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(45)
            .build_cartesian_2d(x_range.clone(), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(ages.len())
            .x_label_formatter(&age_label)
            .x_label_style(("sans-serif", 12))
            .draw()?;

        let fill = Palette99::pick(idx).filled();
        chart.draw_series(counts.iter().enumerate().map(|(i, count)| {
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *count as f64)], fill)
        }))?;
    }

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), races = bars.len(), "age chart saved");
    Ok(())
}

pub fn render_coefficient_plot(path: &Path, report: &RegressionReport) -> Result<()> {
    let rows: Vec<&CoefficientRow> = report.contrasts().collect();
    let Some((lo, hi)) = odds_ratio_range(&rows) else {
        bail!("No finite odds ratios to plot");
    };

    let n = rows.len() as f64;
    let term_label = |x: &f64| {
        let nearest = x.round();
        if (x - nearest).abs() < 1e-6 && nearest >= 0.0 {
            rows.get(nearest as usize)
                .map(|r| r.term.clone())
                .unwrap_or_default()
        } else {
            String::new()
        }
    };

    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "Odds of undocumented perpetrator race vs {} victims (95% CI)",
                report.reference
            ),
            TITLE_FONT,
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(n - 0.5), (lo..hi).log_scale())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len())
        .x_label_formatter(&term_label)
        .x_label_style(("sans-serif", 14))
        .y_label_formatter(&|y| format!("{:.2}", y))
        .x_desc("Victim race")
        .y_desc("Odds ratio (log scale)")
        .draw()?;

    chart.draw_series(LineSeries::new(
        vec![(-0.5, 1.0), (n - 0.5, 1.0)],
        RED.stroke_width(2),
    ))?;

    chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
        ErrorBar::new_vertical(
            i as f64,
            r.odds_ratio_lower,
            r.odds_ratio,
            r.odds_ratio_upper,
            BLUE.stroke_width(2),
            16,
        )
    }))?;

    chart.draw_series(
        rows.iter()
            .enumerate()
            .map(|(i, r)| Circle::new((i as f64, r.odds_ratio), 6, BLUE.filled())),
    )?;

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), terms = rows.len(), "coefficient chart saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_facet_grid() {
        assert_eq!(facet_grid(0), (1, 1));
        assert_eq!(facet_grid(1), (1, 1));
        assert_eq!(facet_grid(5), (2, 3));
        assert_eq!(facet_grid(7), (3, 3));
        let (rows, cols) = facet_grid(8);
        assert!(rows * cols >= 8);
    }

    #[test]
    fn test_fractional_year() {
        assert_eq!(fractional_year(date(2020, 1)), 2020.0);
        assert!((fractional_year(date(2020, 7)) - 2020.5).abs() < 1e-12);
    }

    #[test]
    fn test_borough_series_sorted_by_date() {
        let counts = vec![
            MonthlyCount { month_year: date(2021, 2), borough: "BRONX".into(), count: 4 },
            MonthlyCount { month_year: date(2021, 1), borough: "BRONX".into(), count: 2 },
            MonthlyCount { month_year: date(2021, 1), borough: "QUEENS".into(), count: 1 },
        ];
        let series = borough_series(&counts);

        assert_eq!(series.len(), 2);
        assert_eq!(series["BRONX"][0].1, 2.0);
        assert_eq!(series["BRONX"][1].1, 4.0);
    }

    #[test]
    fn test_age_bars_fill_missing_groups_with_zero() {
        let rows = vec![
            AgeRaceCount { victim_race: "BLACK".into(), victim_age_group: "25-44".into(), count: 5 },
            AgeRaceCount { victim_race: "BLACK".into(), victim_age_group: "<18".into(), count: 1 },
            AgeRaceCount { victim_race: "WHITE".into(), victim_age_group: "25-44".into(), count: 2 },
        ];
        let (ages, bars) = age_bars(&rows);

        assert_eq!(ages, vec!["<18", "25-44"]);
        assert_eq!(bars["BLACK"], vec![1, 5]);
        assert_eq!(bars["WHITE"], vec![0, 2]);
    }

    #[test]
    fn test_odds_ratio_range_includes_one() {
        let row = CoefficientRow {
            term: "BLACK".into(),
            estimate: 1.0,
            std_error: 0.1,
            z_value: 10.0,
            p_value: 0.0,
            ci_lower: 0.804,
            ci_upper: 1.196,
            odds_ratio: 1f64.exp(),
            odds_ratio_lower: 0.804f64.exp(),
            odds_ratio_upper: 1.196f64.exp(),
            predicted_probability: 0.5,
        };
        let (lo, hi) = odds_ratio_range(&[&row]).unwrap();
        assert!(lo < 1.0);
        assert!(hi > 1.196f64.exp());

        assert!(odds_ratio_range(&[]).is_none());
    }
}
