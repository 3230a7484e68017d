//! bhsql — the bytehouse-sql CLI
//!
//! Compiles JSON statements into ByteHouse/ClickHouse SQL and inspects type
//! names and engine clauses.
//!
//! # Usage
//!
//! ```bash
//! # Compile a statement
//! bhsql compile query.json
//! cat query.json | bhsql compile - --literal
//!
//! # Normalize a type name
//! bhsql type "Array(Nullable(Decimal64(4)))"
//!
//! # Re-render a reflected engine
//! bhsql engine "CnchMergeTree PARTITION BY date ORDER BY (date, x)" -c date:Date -c x:Int32
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use bytehouse_sql::prelude::*;

#[derive(Parser)]
#[command(name = "bhsql")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ByteHouse/ClickHouse SQL dialect compiler", long_about = None)]
#[command(after_help = "EXAMPLES:
    bhsql compile select.json --literal
    bhsql compile delete.json --server-version 1.1.54300
    bhsql type 'LowCardinality(Nullable(String))'
    bhsql engine 'CnchMergeTree ORDER BY x' -c x:Int32")]
struct Cli {
    /// Config file (defaults to ./bytehouse-sql.toml, then the user config dir)
    #[arg(long, global = true, env = "BHSQL_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON statement into SQL
    Compile {
        /// Statement file, or `-` for stdin
        input: String,
        /// Inline every bound value
        #[arg(long)]
        literal: bool,
        /// Placeholder style: pyformat, named or qmark
        #[arg(long)]
        param_style: Option<String>,
        /// Server version used to derive capabilities
        #[arg(long)]
        server_version: Option<String>,
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
    /// Parse a type name and print its normalized form
    Type { name: String },
    /// Reflect an engine_full string and render it again
    Engine {
        engine_full: String,
        /// Table column as name:Type, repeatable
        #[arg(short, long = "column")]
        columns: Vec<String>,
        /// Table name the columns belong to
        #[arg(short, long, default_value = "t")]
        table: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Compile {
            input,
            literal,
            param_style,
            server_version,
            json,
        } => compile_command(
            &cli,
            input,
            *literal,
            param_style.as_deref(),
            server_version.as_deref(),
            *json,
        ),
        Commands::Type { name } => type_command(name),
        Commands::Engine {
            engine_full,
            columns,
            table,
        } => engine_command(engine_full, columns, table),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("reading {}", input))
    }
}

fn compile_command(
    cli: &Cli,
    input: &str,
    literal: bool,
    param_style: Option<&str>,
    server_version: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = DialectConfig::discover(cli.config.as_deref())?;

    let mut capabilities = config.capabilities()?;
    if let Some(version) = server_version {
        capabilities = Capabilities::for_server_version(version.parse()?);
    }
    let mut options = config.compile_options();
    if literal {
        options.literal_binds = true;
    }
    if let Some(style) = param_style {
        options.param_style = style.parse()?;
    }

    let statement: Statement =
        serde_json::from_str(&read_input(input)?).context("parsing statement JSON")?;
    let compiled = Compiler::new(&capabilities).options(options).compile(&statement)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&compiled)?);
        return Ok(());
    }

    println!("{}", compiled.sql);
    if !compiled.params.is_empty() {
        println!();
        println!("{}", "Parameters:".cyan());
        for param in &compiled.params {
            println!("  {} = {}", param.name, serde_json::to_string(&param.value)?.yellow());
        }
    }
    if !compiled.rows.is_empty() {
        println!();
        println!("{} {}", compiled.rows.len().to_string().cyan(), "row(s) to send");
    }
    Ok(())
}

fn type_command(name: &str) -> Result<()> {
    let ty = Type::parse(name)?;
    ty.validate()?;
    println!("{}", ty);
    Ok(())
}

fn engine_command(engine_full: &str, columns: &[String], table: &str) -> Result<()> {
    let columns = columns
        .iter()
        .map(|spec| -> Result<Column> {
            let Some((name, ty)) = spec.split_once(':') else {
                bail!("column '{}' is not in name:Type form", spec);
            };
            Ok(Column::new(name.trim(), Type::parse(ty.trim())?))
        })
        .collect::<Result<Vec<_>>>()?;

    let table = Table::reflect(table, columns, Some(engine_full))?;
    match &table.engine {
        Some(engine) => println!("{}", engine.to_ddl_suffix()?),
        None => bail!("no engine found in '{}'", engine_full),
    }
    Ok(())
}
