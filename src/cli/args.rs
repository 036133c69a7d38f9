//! Command-line argument definitions for the SEPOMEX SQL generator
//!
//! Defines the CLI interface using the clap derive API. Settings given on
//! the command line override the configuration file.

use crate::config::SepomexConfig;
use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::error::{Result, SepomexError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the SEPOMEX SQL generator
///
/// Converts the SEPOMEX postal code catalog (pipe-separated text published
/// by Correos de México) into six ordered SQL bulk-insert scripts.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sepomex-sql",
    version,
    about = "Convert the SEPOMEX postal code catalog into ordered SQL insert scripts",
    long_about = "Reads the SEPOMEX postal code catalog as published by Correos de México \
                  (pipe-separated, windows-1252) and writes one transactional INSERT script \
                  per table: estados, municipios, tipos_asentamiento, zonas, ciudades and \
                  codigos_postales. Scripts are numbered in foreign-key order so they can be \
                  loaded one after another."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Generate the six SQL insert scripts
    Generate(GenerateArgs),
    /// Audit the source rows without writing scripts
    Validate(ValidateArgs),
}

/// Arguments for the generate command
#[derive(Debug, Clone, Parser)]
pub struct GenerateArgs {
    /// SEPOMEX source file (e.g. CPdescarga.txt)
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "SEPOMEX source file"
    )]
    pub input: PathBuf,

    /// Directory the scripts are written to
    ///
    /// Created if it does not exist. Scripts from a previous run are replaced.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR,
        help = "Directory for the generated scripts"
    )]
    pub output_dir: PathBuf,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Number of postal-code rows rendered per batch
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Source encoding label (e.g. windows-1252, utf-8, latin1)
    #[arg(long = "encoding", value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Extract and report without writing any script
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write the run report as JSON
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Also write log output to a file
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the validate command
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    /// SEPOMEX source file
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: PathBuf,

    /// Path to configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Source encoding label
    #[arg(long = "encoding", value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Number of most frequent issues to list
    #[arg(long = "show", value_name = "N", default_value_t = 10)]
    pub show: usize,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Map verbosity flags onto a tracing level
fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl GenerateArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Progress bars are hidden in quiet mode or on request
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }

    /// Check argument values clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == Some(0) {
            return Err(SepomexError::configuration(
                "Batch size must be greater than 0",
            ));
        }
        if self.report.is_some() && self.report == self.log_file {
            return Err(SepomexError::configuration(
                "Report and log file must be different paths",
            ));
        }
        Ok(())
    }

    /// Apply command-line settings over a loaded configuration
    pub fn apply_overrides(&self, mut config: SepomexConfig) -> SepomexConfig {
        if let Some(batch_size) = self.batch_size {
            config = config.with_batch_size(batch_size);
        }
        if let Some(encoding) = &self.encoding {
            config = config.with_encoding(encoding.clone());
        }
        if !self.show_progress() {
            config = config.without_progress();
        }
        config
    }
}

impl ValidateArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    pub fn apply_overrides(&self, mut config: SepomexConfig) -> SepomexConfig {
        if let Some(encoding) = &self.encoding {
            config = config.with_encoding(encoding.clone());
        }
        config.without_progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_generate(args: &[&str]) -> GenerateArgs {
        let args = Args::try_parse_from(args).unwrap();
        match args.command {
            Some(Commands::Generate(generate)) => generate,
            other => panic!("Expected generate command, got {other:?}"),
        }
    }

    #[test]
    fn test_generate_defaults() {
        let args = parse_generate(&["sepomex-sql", "generate", "-i", "CPdescarga.txt"]);

        assert_eq!(args.input, PathBuf::from("CPdescarga.txt"));
        assert_eq!(args.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(!args.dry_run);
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.show_progress());
    }

    #[test]
    fn test_generate_overrides() {
        let args = parse_generate(&[
            "sepomex-sql",
            "generate",
            "-i",
            "CPdescarga.txt",
            "--batch-size",
            "500",
            "--encoding",
            "utf-8",
            "--no-progress",
            "-vv",
        ]);
        let config = args.apply_overrides(SepomexConfig::default());

        assert_eq!(config.batch_size, 500);
        assert_eq!(config.encoding, "utf-8");
        assert!(!config.show_progress);
        assert_eq!(args.get_log_level(), "debug");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["sepomex-sql", "generate", "-i", "x.txt", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_hides_progress() {
        let args = parse_generate(&["sepomex-sql", "generate", "-i", "x.txt", "-q"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let args = parse_generate(&["sepomex-sql", "generate", "-i", "x.txt", "--batch-size", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_input_is_required() {
        assert!(Args::try_parse_from(["sepomex-sql", "generate"]).is_err());
    }

    #[test]
    fn test_no_subcommand() {
        let args = Args::try_parse_from(["sepomex-sql"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_validate_args() {
        let args =
            Args::try_parse_from(["sepomex-sql", "validate", "-i", "x.txt", "--show", "3"]).unwrap();
        match args.command {
            Some(Commands::Validate(validate)) => {
                assert_eq!(validate.show, 3);
                assert_eq!(validate.get_log_level(), "warn");
            }
            other => panic!("Expected validate command, got {other:?}"),
        }
    }
}
