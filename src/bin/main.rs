//! obsql CLI - Compile observation filters to SQL
//!
//! Usage:
//!   obsql compile <filter.json> --entity <entity> [--config <file>] [--count] [--output <format>]
//!   obsql tables [--config <file>]
//!
//! Examples:
//!   obsql compile latest.json --entity observation
//!   obsql compile streams.json --entity datastream --config obsql.toml --count
//!   obsql tables

use clap::{Parser, Subcommand, ValueEnum};
use obsql::compile::{compile_filter, CompileContext};
use obsql::config::Settings;
use obsql::filter::{EntityFilter, EntityKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "obsql")]
#[command(about = "obsql - Compile observation store filters to SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON filter to SQL
    Compile {
        /// Path to the filter document
        file: PathBuf,

        /// Entity kind the filter selects
        #[arg(short, long, default_value = "observation")]
        entity: EntityArg,

        /// Config file (defaults to the usual search locations)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit the COUNT(*) form of the query
        #[arg(long)]
        count: bool,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Show the configured table per entity kind
    Tables {
        /// Config file (defaults to the usual search locations)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum EntityArg {
    Observation,
    ObsStats,
    Datastream,
    Foi,
    System,
    CommandStream,
    Command,
}

impl From<EntityArg> for EntityKind {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::Observation => EntityKind::Observation,
            EntityArg::ObsStats => EntityKind::ObservationStatistics,
            EntityArg::Datastream => EntityKind::DataStream,
            EntityArg::Foi => EntityKind::FeatureOfInterest,
            EntityArg::System => EntityKind::System,
            EntityArg::CommandStream => EntityKind::CommandStream,
            EntityArg::Command => EntityKind::Command,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL only
    Sql,
    /// Output SQL with comments
    Verbose,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            file,
            entity,
            config,
            count,
            output,
        } => cmd_compile(file, entity.into(), config, count, output),
        Commands::Tables { config } => cmd_tables(config),
    }
}

fn load_settings(config: Option<&Path>) -> Option<Settings> {
    let result = match config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    match result {
        Ok(settings) => Some(settings),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            None
        }
    }
}

fn cmd_compile(
    file: PathBuf,
    entity: EntityKind,
    config: Option<PathBuf>,
    count: bool,
    output: OutputFormat,
) -> ExitCode {
    let Some(settings) = load_settings(config.as_deref()) else {
        return ExitCode::FAILURE;
    };

    // Read the file
    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let filter = match EntityFilter::from_json(entity, &source) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Invalid {} filter in '{}': {}", entity, file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match compile_filter(&filter, CompileContext::new(&settings.tables)) {
        Ok(compiled) => {
            let sql = if count {
                &compiled.count_sql
            } else {
                &compiled.sql
            };
            match output {
                OutputFormat::Sql => {
                    println!("{}", sql);
                }
                OutputFormat::Verbose => {
                    println!("-- obsql Compiled SQL");
                    println!("-- Source: {}", file.display());
                    println!("-- Entity: {}", entity);
                    for (kind, table) in settings.tables.iter() {
                        println!("-- Table {}: {}", kind, table);
                    }
                    println!();
                    println!("{}", sql);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_tables(config: Option<PathBuf>) -> ExitCode {
    let Some(settings) = load_settings(config.as_deref()) else {
        return ExitCode::FAILURE;
    };

    let tables = &settings.tables;
    for entity in [
        EntityKind::Observation,
        EntityKind::DataStream,
        EntityKind::FeatureOfInterest,
        EntityKind::System,
        EntityKind::CommandStream,
        EntityKind::Command,
    ] {
        match tables.table_for(entity) {
            Some(table) => println!("{:<15} {}", entity, table),
            None => println!("{:<15} (no store)", entity),
        }
    }

    ExitCode::SUCCESS
}
