//! shooting-eda: NYPD shooting incident analysis CLI

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use shooting_eda::cli::{AnalysisConfig, Cli};
use shooting_eda::pipeline::{
    aggregate_murder_counts, clean, describe, fit_missing_race_model, load_dataset_with_progress,
    monthly_counts, total_count, validate_schema,
};
use shooting_eda::report::{
    borough_trends, display_borough_trends, display_coefficients, display_descriptive_stats,
    export_analysis, render_all, AnalysisExport, AnalysisSummary,
};
use shooting_eda::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = AnalysisConfig::from_cli(&cli);

    print_banner(env!("CARGO_PKG_VERSION"));
    let charts_label = config.charts_dir.as_ref().map(|p| p.display().to_string());
    let export_label = config.export.as_ref().map(|p| p.display().to_string());
    print_config(
        &config.source.to_string(),
        &config.regression.reference,
        charts_label.as_deref(),
        export_label.as_deref(),
    );

    // Step 1: Load
    print_step_header(1, "Load Incidents");
    let step_start = Instant::now();
    println!();
    let (raw, rows, cols, memory_mb) = load_dataset_with_progress(&config.source)?;
    validate_schema(&raw)?;
    print_success("Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let mut summary = AnalysisSummary::new(rows, cols);
    let elapsed = step_start.elapsed();
    summary.set_load_time(elapsed);
    print_step_time(elapsed);

    // Step 2: Clean
    print_step_header(2, "Clean Murder Records");
    let step_start = Instant::now();
    let spinner = create_spinner("Filtering murders and imputing missing fields...");
    let cleaned = clean(&raw)?;
    if cleaned.dropped_unparsed_dates > 0 {
        finish_with_warning(&spinner, "Cleaning complete, some dates were unparseable");
        print_warning(&format!(
            "{} murders dropped for an unparseable OCCUR_DATE",
            cleaned.dropped_unparsed_dates
        ));
    } else {
        finish_with_success(&spinner, "Cleaning complete");
    }
    print_count("murders", cleaned.data.height(), Some(&format!("of {} incidents", rows)));
    summary.set_cleaned(
        cleaned.data.height(),
        cleaned.data.width(),
        cleaned.dropped_unparsed_dates,
    );
    let elapsed = step_start.elapsed();
    summary.set_clean_time(elapsed);
    print_step_time(elapsed);

    // Step 3: Describe and aggregate
    print_step_header(3, "Describe and Aggregate");
    let step_start = Instant::now();
    let spinner = create_spinner("Counting murders by month and borough...");
    let stats = describe(&raw, &cleaned)?;
    let counts_df = aggregate_murder_counts(&cleaned.data)?;
    let counts = monthly_counts(&counts_df)?;
    let counted = total_count(&counts_df)?;
    anyhow::ensure!(
        counted as usize == cleaned.data.height(),
        "Monthly counts sum to {} but {} murders were cleaned",
        counted,
        cleaned.data.height()
    );
    finish_with_success(&spinner, "Aggregation complete");
    print_count("month × borough groups", counts.len(), None);
    summary.aggregate_groups = counts.len();

    display_descriptive_stats(&stats);
    display_borough_trends(&borough_trends(&counts));

    let elapsed = step_start.elapsed();
    summary.set_analysis_time(elapsed);
    print_step_time(elapsed);

    // Step 4: Regression
    print_step_header(4, "Undocumented Perpetrator Race Model");
    let step_start = Instant::now();
    let spinner = create_spinner("Fitting logistic regression (IRLS)...");
    let model = match fit_missing_race_model(&cleaned.data, &config.regression) {
        Ok(model) => model,
        Err(e) if e.is_degenerate() => {
            finish_with_warning(&spinner, "Model could not be estimated");
            print_warning(&format!("Degenerate regression input: {}", e));
            return Err(e).context("Logistic regression is not estimable on this data");
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e).context("Logistic regression failed");
        }
    };
    finish_with_success(
        &spinner,
        &format!("Converged in {} iterations", model.iterations),
    );
    summary.regression_observations = model.observations;
    display_coefficients(&model);

    let elapsed = step_start.elapsed();
    summary.set_regression_time(elapsed);
    print_step_time(elapsed);

    // Step 5: Charts and export
    print_step_header(5, "Charts and Export");
    let step_start = Instant::now();
    match &config.charts_dir {
        Some(dir) => {
            let spinner = create_spinner("Rendering charts...");
            summary.charts_written = match render_all(dir, &counts, &stats.age_by_race, &model) {
                Ok(paths) => paths,
                Err(e) => {
                    finish_with_warning(&spinner, "Chart rendering failed");
                    return Err(e);
                }
            };
            finish_with_success(
                &spinner,
                &format!("{} charts written to {}", summary.charts_written.len(), dir.display()),
            );
        }
        None => print_info("Chart rendering disabled"),
    }

    if let Some(path) = &config.export {
        let export = AnalysisExport::new(&config, &stats, &counts, &model);
        export_analysis(&export, path)?;
        print_success(&format!("Results exported to {}", path.display()));
        summary.export_path = Some(path.clone());
    }

    let elapsed = step_start.elapsed();
    summary.set_chart_time(elapsed);
    print_step_time(elapsed);

    summary.display();
    print_completion();

    Ok(())
}
