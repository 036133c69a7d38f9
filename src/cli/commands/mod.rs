//! Command implementations for the SEPOMEX SQL CLI

pub mod generate;
pub mod shared;
pub mod validate;

use crate::cli::args::{Args, Commands};
use anyhow::Result;

/// Main command dispatcher
pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Commands::Generate(generate_args)) => {
            generate::run_generate(generate_args)?;
        }
        Some(Commands::Validate(validate_args)) => {
            validate::run_validate(validate_args)?;
        }
        None => {}
    }
    Ok(())
}
