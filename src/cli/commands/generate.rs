//! Generate command: source file to six SQL scripts

use super::shared::{format_rate, load_configuration, setup_logging};
use crate::cli::args::GenerateArgs;
use crate::models::{EntityStats, RunReport};
use crate::processor::Pipeline;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::fs;
use tracing::info;

/// Run the generate command
pub fn run_generate(args: GenerateArgs) -> Result<RunReport> {
    args.validate()?;
    setup_logging(
        args.get_log_level(),
        args.quiet,
        args.log_file.as_deref(),
    )?;

    let config = args.apply_overrides(load_configuration(args.config_file.as_deref())?);
    info!(
        "Generating scripts from {} into {}",
        args.input.display(),
        args.output_dir.display()
    );

    let pipeline = Pipeline::new(config, &args.output_dir)?.with_dry_run(args.dry_run);
    let report = pipeline
        .run(&args.input)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    if !args.quiet {
        print_summary(&report);
    }

    if let Some(path) = &args.report {
        fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    let failures = report.write_failures();
    if failures > 0 {
        bail!("{} of {} scripts could not be written", failures, report.entities.len());
    }

    Ok(report)
}

fn print_summary(report: &RunReport) {
    let title = if report.dry_run {
        "Processing Summary (dry run)"
    } else {
        "Processing Summary"
    };
    println!("\n{}", title.bright_green().bold());
    println!(
        "  {} {}",
        "Source rows:".bright_cyan(),
        report.input_rows.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Rows written:".bright_cyan(),
        report.total_written().to_string().bright_white()
    );
    let errors = report.total_errors().to_string();
    println!(
        "  {} {}",
        "Rows with errors:".bright_cyan(),
        if report.total_errors() > 0 {
            errors.bright_yellow()
        } else {
            errors.bright_white()
        }
    );
    println!(
        "  {} {}ms",
        "Elapsed:".bright_cyan(),
        report.elapsed_ms.to_string().bright_white()
    );

    println!("\n{}", "Scripts".bright_green().bold());
    for stats in &report.entities {
        print_entity(stats);
    }

    if !report.dry_run {
        println!(
            "\n  {} {}",
            "Output directory:".bright_cyan(),
            report.output_dir.display().to_string().bright_white()
        );
    }
}

fn print_entity(stats: &EntityStats) {
    let name = format!("{:<20}", stats.table);
    let mut counts = format!(
        "{:>7} written {:>6} duplicates {:>6} errors",
        stats.written,
        stats.duplicates,
        stats.error_count()
    );
    if stats.scanned > 0 {
        counts.push_str(&format!("  {} valid", format_rate(stats.success_rate())));
    }

    if let Some(error) = &stats.write_error {
        println!("  {} {}", name.bright_red(), format!("write failed: {}", error).bright_red());
    } else if let Some(error) = &stats.structural_error {
        println!("  {} {}", name.bright_yellow(), error.bright_yellow());
    } else {
        println!("  {} {}", name.bright_cyan(), counts.bright_white());
    }

    for (reason, count) in &stats.reasons {
        println!("      {} {}", format!("{}:", reason).dimmed(), count);
    }
}
