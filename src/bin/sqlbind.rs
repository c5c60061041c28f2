//! sqlbind - named-parameter SQL compiler CLI
//!
//! # Usage
//!
//! ```bash
//! # Compile a template
//! sqlbind "SELECT * FROM users WHERE id = :id" -p id=42
//!
//! # Bindings from JSON, machine-readable output
//! sqlbind -f query.sql --params-json '{"id": 42}' --format json
//!
//! # List recognized parameters
//! sqlbind refs "SELECT :a, ':b', :a"
//! ```

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqlbind::preprocess::guess_dialect;
use sqlbind::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlbind")]
#[command(version)]
#[command(about = "Compile :named SQL parameters into ? placeholders", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlbind 'SELECT * FROM users WHERE id = :id' -p id=42
    sqlbind 'UPDATE t SET a = :a WHERE b = :b' -p a=\"'x'\" -p b=7 --format json
    sqlbind refs 'SELECT :a /* :hidden */, :b' --format json")]
struct Cli {
    /// The SQL template
    sql: Option<String>,

    /// Read the SQL template from a file
    #[arg(short, long, conflicts_with = "sql")]
    file: Option<String>,

    /// Named binding as name=value (repeatable)
    #[arg(short, long = "param")]
    param: Vec<String>,

    /// Named bindings as a JSON object
    #[arg(long)]
    params_json: Option<String>,

    /// Positional bindings, comma separated
    #[arg(long, value_delimiter = ',')]
    positional: Vec<String>,

    /// Only compile parameters; keep comments and semicolons
    #[arg(long)]
    compile_only: bool,

    /// Reject unterminated literals and block comments
    #[arg(long, global = true)]
    strict: bool,

    /// Pass `::` casts through instead of reading a parameter after them
    #[arg(long, global = true)]
    casts: bool,

    /// Configuration file (defaults to ./sqlbind.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Connection URL, used to report the dialect
    #[arg(long, env = "SQLBIND_DATABASE_URL")]
    url: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the parameter references a template contains
    Refs {
        /// The SQL template
        sql: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "sqlbind=debug" } else { "sqlbind=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let options = compiler_options(cli)?;

    if let Some(Commands::Refs { sql }) = &cli.command {
        return show_references(sql, options, &cli.format);
    }

    let sql = match (&cli.sql, &cli.file) {
        (Some(sql), _) => sql.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file '{}'", path))?,
        (None, None) => {
            println!("{}", "sqlbind: named-parameter SQL compiler".cyan().bold());
            println!();
            println!("Usage: sqlbind <SQL> [OPTIONS]");
            println!();
            println!("Try: sqlbind --help");
            return Ok(());
        }
    };

    if cli.verbose {
        eprintln!("{} {}", "Input:".dimmed(), sql.yellow());
    }

    let bindings = bindings(cli)?;

    let stmt = if cli.compile_only {
        let Bindings::Named(params) = bindings else {
            bail!("--compile-only needs named bindings (-p or --params-json)");
        };
        let (sql, values) = Compiler::new(options).compile(&sql, &params)?.into_parts();
        PreparedStatement {
            statement_type: sqlbind::preprocess::detect_type(&sql),
            sql_hash: sqlbind::preprocess::sql_hash(&sql),
            sql,
            values,
        }
    } else {
        prepare(&sql, bindings, options)?
    };

    let dialect = cli.url.as_deref().map(guess_dialect);
    print_statement(&stmt, dialect, &cli.format)
}

fn compiler_options(cli: &Cli) -> anyhow::Result<CompilerOptions> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover()?,
    };
    let mut options = config.compiler;
    options.strict |= cli.strict;
    options.pass_through_casts |= cli.casts;
    Ok(options)
}

fn bindings(cli: &Cli) -> anyhow::Result<Bindings<SqlValue>> {
    let mut named: HashMap<String, SqlValue> = match &cli.params_json {
        Some(json) => serde_json::from_str(json).context("Invalid --params-json")?,
        None => HashMap::new(),
    };

    for pair in &cli.param {
        let (name, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected name=value, got '{}'", pair))?;
        let name = name.trim().trim_start_matches(':');
        named.insert(name.to_string(), SqlValue::parse_literal(raw));
    }

    let has_named = cli.params_json.is_some() || !cli.param.is_empty();
    match (has_named, cli.positional.is_empty()) {
        (true, false) => bail!("positional and named cannot be used together"),
        (true, true) => Ok(Bindings::Named(named)),
        (false, false) => Ok(Bindings::Positional(
            cli.positional.iter().map(|v| SqlValue::parse_literal(v)).collect(),
        )),
        (false, true) => Ok(Bindings::None),
    }
}

fn print_statement(
    stmt: &PreparedStatement<SqlValue>,
    dialect: Option<Dialect>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_value(stmt)?;
            if let (Some(d), Some(obj)) = (dialect, out.as_object_mut()) {
                obj.insert("dialect".to_string(), serde_json::to_value(d)?);
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("{}", "Compiled SQL:".green().bold());
            println!("{}", stmt.sql.white());

            if !stmt.values.is_empty() {
                println!();
                println!("{}", "Bindings:".cyan());
                for (i, v) in stmt.values.iter().enumerate() {
                    println!("  ?{} = {}", i + 1, v.to_string().yellow());
                }
            }

            println!();
            println!("{} {}", "Type:".dimmed(), stmt.statement_type.to_string().cyan());
            if let Some(d) = dialect {
                println!("{} {}", "Dialect:".dimmed(), d.to_string().cyan());
            }
            println!("{} {}", "Hash:".dimmed(), stmt.sql_hash.dimmed());
        }
    }
    Ok(())
}

fn show_references(sql: &str, options: CompilerOptions, format: &OutputFormat) -> anyhow::Result<()> {
    let refs = Compiler::new(options).references(sql)?;

    match format {
        OutputFormat::Json => {
            let items: Vec<serde_json::Value> = refs
                .iter()
                .map(|r| serde_json::json!({ "name": r.name, "offset": r.offset }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            if refs.is_empty() {
                println!("{}", "(no parameters)".dimmed());
                return Ok(());
            }
            println!("{}", "Parameters:".green().bold());
            for (i, r) in refs.iter().enumerate() {
                println!(
                    "  ?{} {} {}",
                    i + 1,
                    format!(":{}", r.name).cyan(),
                    format!("@{}", r.offset).dimmed()
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sqlbind", "refs", "SELECT :a", "--format", "json", "--strict", "--casts",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(cli.strict);
        assert!(cli.casts);
        assert!(matches!(cli.command, Some(Commands::Refs { ref sql }) if sql == "SELECT :a"));
    }

    #[test]
    fn test_named_and_positional_conflict() {
        let cli = Cli::try_parse_from(["sqlbind", "SELECT :a", "-p", "a=1", "--positional", "1"])
            .unwrap();
        assert!(bindings(&cli).is_err());
    }

    #[test]
    fn test_param_literals() {
        let cli = Cli::try_parse_from(["sqlbind", "SELECT :a, :b", "-p", ":a=TRUE", "-p", "b='x'"])
            .unwrap();
        let Bindings::Named(named) = bindings(&cli).unwrap() else {
            panic!("expected named bindings");
        };
        assert_eq!(named["a"], SqlValue::Bool(true));
        assert_eq!(named["b"], SqlValue::String("x".into()));
    }
}
