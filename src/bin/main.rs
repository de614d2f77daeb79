//! Trellis CLI - Compile query requests against a schema definition
//!
//! Usage:
//!   trellis compile --schema <schema.json> --query <query.json> [--limit <n>]
//!   trellis validate --schema <schema.json>
//!   trellis tables --schema <schema.json>
//!
//! Examples:
//!   trellis compile --schema demo/schema.json --query demo/top_vendors.json
//!   trellis compile --schema demo/schema.json --query demo/top_vendors.json --output verbose
//!   trellis tables --schema demo/schema.json

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use trellis::compile::{compile_query_json, CompileOptions};
use trellis::schema::ResolvedSchema;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Trellis - compiles schemas and query requests to parameterized SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query request to SQL
    Compile {
        /// Path to the schema definition JSON
        #[arg(short, long)]
        schema: PathBuf,

        /// Path to the query request JSON
        #[arg(short, long)]
        query: PathBuf,

        /// Maximum number of result rows
        #[arg(short, long, default_value_t = 100)]
        limit: u64,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Validate a schema definition without compiling anything
    Validate {
        /// Path to the schema definition JSON
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// List the resolved tables of a schema definition
    Tables {
        /// Path to the schema definition JSON
        #[arg(short, long)]
        schema: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL only
    Sql,
    /// Output SQL with comments and the bound parameter table
    Verbose,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            schema,
            query,
            limit,
            output,
        } => cmd_compile(schema, query, limit, output),
        Commands::Validate { schema } => cmd_validate(schema),
        Commands::Tables { schema } => cmd_tables(schema),
    }
}

fn load_schema(path: &Path) -> Result<ResolvedSchema, ExitCode> {
    let text = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return Err(ExitCode::FAILURE);
        }
    };

    match ResolvedSchema::from_json(&text) {
        Ok(schema) => Ok(schema),
        Err(e) => {
            eprintln!("Schema error: {}", e);
            Err(ExitCode::FAILURE)
        }
    }
}

fn cmd_compile(
    schema_path: PathBuf,
    query_path: PathBuf,
    limit: u64,
    output: OutputFormat,
) -> ExitCode {
    let schema = match load_schema(&schema_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let request_json = match fs::read_to_string(&query_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", query_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let options = CompileOptions::default().with_limit(limit);

    match compile_query_json(&schema, &request_json, options) {
        Ok(compiled) => {
            match output {
                OutputFormat::Sql => {
                    println!("{}", compiled.sql);
                }
                OutputFormat::Verbose => {
                    println!("-- Trellis Compiled SQL");
                    println!("-- Schema: {}", schema_path.display());
                    println!("-- Query: {}", query_path.display());
                    println!();
                    println!("{}", compiled.sql);
                    println!();
                    if compiled.params.is_empty() {
                        println!("-- No bound parameters");
                    } else {
                        println!("-- Bound parameters:");
                        for (name, value) in compiled.params.iter() {
                            println!("--   @{} = {}", name, value);
                        }
                    }
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

fn cmd_validate(schema_path: PathBuf) -> ExitCode {
    match load_schema(&schema_path) {
        Ok(schema) => {
            println!(
                "OK: {} defines {} tables",
                schema_path.display(),
                schema.tables.len()
            );
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

fn cmd_tables(schema_path: PathBuf) -> ExitCode {
    let schema = match load_schema(&schema_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    println!("Schema: {} (db: {})", schema.name, schema.name_in_db);
    println!();

    for table in &schema.tables {
        println!("{} (db: {})", table.name, table.name_in_db);
        print_column(&table.id_column, true);
        for column in &table.columns {
            print_column(column, false);
        }
        println!();
    }

    ExitCode::SUCCESS
}

fn print_column(column: &trellis::schema::Column, is_id: bool) {
    let mut notes = Vec::new();
    if is_id {
        notes.push("id".to_string());
    }
    if column.nullable {
        notes.push("nullable".to_string());
    }
    if let Some(target) = &column.target {
        notes.push(format!("-> {}", target));
    }
    if let Some(extends) = &column.extends {
        notes.push(format!("extends {}", extends));
    }

    let suffix = if notes.is_empty() {
        String::new()
    } else {
        format!(" ({})", notes.join(", "))
    };
    println!("  - {}: {:?}{}", column.name, column.data_type, suffix);
}
