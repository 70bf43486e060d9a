//! Command-line interface for eson

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use eson::limits::ValidatorConfig;
#[cfg(feature = "cli")]
use eson::loaders::{load_document_file, load_schema_file};
#[cfg(feature = "cli")]
use eson::validators::{DocumentValidator, ValidationReport};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "eson")]
#[command(author, version, about = "ESON instance document validation tool", long_about = None)]
struct Cli {
    /// Log more (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate instance documents against a schema
    Validate {
        /// Path to the JSON schema file
        #[arg(short, long, value_name = "SCHEMA")]
        schema: PathBuf,

        /// Path to a JSON validator configuration
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Output diagnostics as JSON
        #[arg(short, long)]
        json: bool,

        /// Documents to validate
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate {
            schema,
            config,
            json,
            files,
        } => cmd_validate(schema, config, json, files),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

/// Returns whether every document is free of errors
#[cfg(feature = "cli")]
fn cmd_validate(
    schema_path: PathBuf,
    config_path: Option<PathBuf>,
    json_output: bool,
    files: Vec<PathBuf>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let schema = load_schema_file(&schema_path)?;
    let config = match config_path {
        Some(path) => ValidatorConfig::from_file(path)?,
        None => ValidatorConfig::default(),
    };
    let validator = DocumentValidator::new(&schema).with_config(config);

    let mut all_valid = true;
    let mut reports = Vec::new();
    for file in &files {
        let document = load_document_file(&schema, file)?;
        let report = validator.validate(&document)?;
        all_valid &= passes(&report);

        if json_output {
            reports.push(serde_json::json!({
                "uri": report.uri.to_string(),
                "diagnostics": report.diagnostics,
                "failures": report.failures.iter().map(ToString::to_string).collect::<Vec<_>>(),
            }));
            continue;
        }

        if report.diagnostics.is_empty() && report.failures.is_empty() {
            println!("✓ {} is valid", file.display());
            continue;
        }
        println!("✗ {}", file.display());
        for diagnostic in &report.diagnostics {
            println!("  - {}", diagnostic);
        }
        for failure in &report.failures {
            println!("  - could not check: {}", failure);
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(all_valid)
}

/// A document passes when it has no errors and every node could be checked
#[cfg(feature = "cli")]
fn passes(report: &ValidationReport) -> bool {
    report.is_valid()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
