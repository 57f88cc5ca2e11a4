//! Descriptive statistics tables for the terminal report

use std::collections::BTreeMap;

use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Table};

use crate::pipeline::{CategoryCount, DescriptiveStats, MonthlyCount};
use crate::utils::{print_indented, print_section};

/// Murder totals and peak month of one borough
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoroughTrend {
    pub borough: String,
    pub total: u64,
    pub months_observed: usize,
    pub peak_month: NaiveDate,
    pub peak_count: u64,
    pub first_month: NaiveDate,
    pub last_month: NaiveDate,
}

/// Summarize the monthly series of every borough.
///
/// Ties for the peak keep the earliest month.
pub fn borough_trends(counts: &[MonthlyCount]) -> Vec<BoroughTrend> {
    let mut by_borough: BTreeMap<&str, Vec<&MonthlyCount>> = BTreeMap::new();
    for row in counts {
        by_borough.entry(row.borough.as_str()).or_default().push(row);
    }

    by_borough
        .into_iter()
        .filter_map(|(borough, mut rows)| {
            rows.sort_by_key(|r| r.month_year);
            let first = rows.first()?;
            let last = rows.last()?;
            let peak = rows
                .iter()
                .fold(*first, |best, r| if r.count > best.count { r } else { best });

            Some(BoroughTrend {
                borough: borough.to_string(),
                total: rows.iter().map(|r| r.count).sum(),
                months_observed: rows.len(),
                peak_month: peak.month_year,
                peak_count: peak.count,
                first_month: first.month_year,
                last_month: last.month_year,
            })
        })
        .collect()
}

/// Print the headline numbers and category breakdowns
pub fn display_descriptive_stats(stats: &DescriptiveStats) {
    print_section("📊", "MURDERS AT A GLANCE");
    println!(
        "      {} incidents, {} murders ({:.1}%)",
        stats.total_incidents,
        stats.murders,
        stats.murder_share * 100.0
    );

    display_category_table("Borough", &stats.by_borough, stats.murders);
    display_category_table("Victim race", &stats.by_victim_race, stats.murders);
    display_category_table("Victim sex", &stats.by_victim_sex, stats.murders);

    print_section("🧍", "VICTIM AGE GROUP BY RACE");
    let mut ages: Vec<&str> = stats
        .age_by_race
        .iter()
        .map(|r| r.victim_age_group.as_str())
        .collect();
    ages.sort_by_key(|a| age_group_rank(a));
    ages.dedup();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    let mut header = vec![Cell::new("Victim race").add_attribute(Attribute::Bold)];
    header.extend(ages.iter().map(|a| Cell::new(a).add_attribute(Attribute::Bold)));
    table.set_header(header);

    let mut races: Vec<&str> = stats
        .age_by_race
        .iter()
        .map(|r| r.victim_race.as_str())
        .collect();
    races.dedup();

    for race in races {
        let mut row = vec![Cell::new(race)];
        for age in &ages {
            let count = stats
                .age_by_race
                .iter()
                .find(|r| r.victim_race == race && r.victim_age_group == *age)
                .map(|r| r.count)
                .unwrap_or(0);
            row.push(Cell::new(count).set_alignment(CellAlignment::Right));
        }
        table.add_row(row);
    }
    print_indented(&table.to_string());

    print_section("❓", "UNDOCUMENTED PERPETRATOR RACE BY VICTIM RACE");
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Victim race").add_attribute(Attribute::Bold),
        Cell::new("Murders").add_attribute(Attribute::Bold),
        Cell::new("Perp race undocumented").add_attribute(Attribute::Bold),
        Cell::new("Share").add_attribute(Attribute::Bold),
    ]);
    for share in &stats.missing_perp_race {
        table.add_row(vec![
            Cell::new(&share.victim_race),
            Cell::new(share.murders).set_alignment(CellAlignment::Right),
            Cell::new(share.perp_race_missing).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", share.share * 100.0)).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table.to_string());
}

/// Print per-borough totals and peak months of the monthly murder series
pub fn display_borough_trends(trends: &[BoroughTrend]) {
    print_section("📈", "MONTHLY MURDERS BY BOROUGH");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Borough").add_attribute(Attribute::Bold),
        Cell::new("Murders").add_attribute(Attribute::Bold),
        Cell::new("Months").add_attribute(Attribute::Bold),
        Cell::new("Span").add_attribute(Attribute::Bold),
        Cell::new("Peak month").add_attribute(Attribute::Bold),
    ]);
    for trend in trends {
        table.add_row(vec![
            Cell::new(&trend.borough),
            Cell::new(trend.total).set_alignment(CellAlignment::Right),
            Cell::new(trend.months_observed).set_alignment(CellAlignment::Right),
            Cell::new(format!(
                "{} – {}",
                trend.first_month.format("%Y-%m"),
                trend.last_month.format("%Y-%m")
            )),
            Cell::new(format!("{} ({})", trend.peak_month.format("%Y-%m"), trend.peak_count)),
        ]);
    }
    print_indented(&table.to_string());
}

fn display_category_table(title: &str, counts: &[CategoryCount], total: usize) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new(title).add_attribute(Attribute::Bold),
        Cell::new("Murders").add_attribute(Attribute::Bold),
        Cell::new("Share").add_attribute(Attribute::Bold),
    ]);
    for count in counts {
        let share = if total > 0 {
            count.count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        table.add_row(vec![
            Cell::new(&count.category),
            Cell::new(count.count).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", share)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!();
    print_indented(&table.to_string());
}

/// Sort key placing "<18" before the numeric bands and unlabelled groups last
pub fn age_group_rank(label: &str) -> (u8, String) {
    if label.starts_with('<') {
        (0, label.to_string())
    } else if label.starts_with(|c: char| c.is_ascii_digit()) {
        (1, label.to_string())
    } else {
        (2, label.to_string())
    }
}
