use clap::Parser;
use sepomex_sql::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("SEPOMEX SQL - Mexican Postal Code Catalog Converter");
    println!("===================================================");
    println!();
    println!("Convert the SEPOMEX postal code catalog (CPdescarga.txt) into six");
    println!("transactional SQL insert scripts, numbered in foreign-key order.");
    println!();
    println!("USAGE:");
    println!("    sepomex-sql <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    generate    Generate the SQL insert scripts (main command)");
    println!("    validate    Audit the source rows without writing scripts");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Generate scripts into ./generated_sql:");
    println!("    sepomex-sql generate --input CPdescarga.txt");
    println!();
    println!("    # Custom output directory, JSON report and a UTF-8 source:");
    println!("    sepomex-sql generate -i CPdescarga.txt -o sql --encoding utf-8 \\");
    println!("                         --report run.json");
    println!();
    println!("    # Check the source without writing anything:");
    println!("    sepomex-sql validate --input CPdescarga.txt --show 20");
    println!();
    println!("For detailed help on any command, use:");
    println!("    sepomex-sql <COMMAND> --help");
}
