//! Validate command: audit source rows without generating scripts

use super::shared::{format_rate, load_configuration, setup_logging};
use crate::cli::args::ValidateArgs;
use crate::reader::read_source;
use crate::validation::{AuditReport, audit_records};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

/// Run the validate command
pub fn run_validate(args: ValidateArgs) -> Result<AuditReport> {
    setup_logging(args.get_log_level(), args.quiet, None)?;

    let config = args.apply_overrides(load_configuration(args.config_file.as_deref())?);
    config.validate()?;

    info!("Validating {}", args.input.display());
    let records = read_source(&args.input, &config)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let report = audit_records(&records, &config.schema_contract()?, &config.limits);

    if !args.quiet {
        print_audit(&report, args.show);
    }

    Ok(report)
}

fn print_audit(report: &AuditReport, show: usize) {
    println!("\n{}", "Validation Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Rows:".bright_cyan(),
        report.rows.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Valid rows:".bright_cyan(),
        report.valid.to_string().bright_white()
    );
    let invalid = report.invalid.to_string();
    println!(
        "  {} {}",
        "Invalid rows:".bright_cyan(),
        if report.invalid > 0 {
            invalid.bright_red()
        } else {
            invalid.bright_white()
        }
    );
    if report.row_errors > 0 {
        println!(
            "  {} {}",
            "Unreadable rows:".bright_cyan(),
            report.row_errors.to_string().bright_red()
        );
    }
    println!(
        "  {} {}",
        "Valid rate:".bright_cyan(),
        format_rate(report.valid_rate()).bright_white()
    );

    if !report.missing_columns.is_empty() {
        println!(
            "  {} {}",
            "Missing columns:".bright_cyan(),
            report.missing_columns.join(", ").bright_yellow()
        );
    }

    let issues = report.issues.most_frequent(show);
    if !issues.is_empty() {
        println!("\n{}", "Most frequent issues".bright_green().bold());
        for (field, kind, count) in issues {
            println!(
                "  {:>7}  {}",
                count.to_string().bright_white(),
                format!("{}: {}", field, kind).bright_yellow()
            );
        }
    }
}
