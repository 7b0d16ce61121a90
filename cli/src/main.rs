//! Querylens CLI
//!
//! Command-line interface for inspecting captured ORM statement logs offline.
//!
//! # Usage
//!
//! ```bash
//! querylens --help
//! querylens parse statements.log
//! tail -n 50 app.log | querylens parse --json
//! querylens format "SELECT id FROM users WHERE id = 1"
//! querylens emit "SELECT 1" --time 0.001 --memory 2MB
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use shared::config::{DelimiterScheme, DEFAULT_INNER_GLUE, DEFAULT_OUTER_GLUE};
use shared::format::format_sql;
use shared::models::{QueryRecord, QueryRecordSet};
use shared::parser::{build_queries, render_log_line};
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Querylens CLI - ORM statement log inspector
#[derive(Parser)]
#[command(name = "querylens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse statement log lines into queries
    Parse {
        /// Log file to read (default: stdin)
        file: Option<PathBuf>,

        #[command(flatten)]
        glue: GlueArgs,

        /// Print the queries as JSON
        #[arg(long)]
        json: bool,

        /// Print highlighted SQL markup instead of the raw SQL
        #[arg(long)]
        highlight: bool,
    },
    /// Print the highlighted markup of a SQL statement
    Format {
        /// SQL statement
        sql: String,
    },
    /// Print the log line the ORM would write for a statement
    Emit {
        /// SQL statement
        sql: String,

        /// Elapsed time
        #[arg(long, default_value = "0")]
        time: String,

        /// Memory usage
        #[arg(long, default_value = "0")]
        memory: String,

        /// Connection name
        #[arg(long, default_value = "default")]
        connection: String,

        #[command(flatten)]
        glue: GlueArgs,
    },
}

#[derive(Args)]
struct GlueArgs {
    /// Separator between the blocks of a log line
    #[arg(long, env = "QUERYLENS_OUTER_GLUE", default_value = DEFAULT_OUTER_GLUE)]
    outer_glue: String,

    /// Separator between a label and its value
    #[arg(long, env = "QUERYLENS_INNER_GLUE", default_value = DEFAULT_INNER_GLUE)]
    inner_glue: String,
}

impl GlueArgs {
    fn scheme(&self) -> Result<DelimiterScheme> {
        let scheme = DelimiterScheme::new(self.outer_glue.as_str(), self.inner_glue.as_str());
        scheme.validate_scheme()?;
        Ok(scheme)
    }
}

#[derive(Serialize)]
struct ParseReport<'a> {
    query_count: usize,
    time: f64,
    queries: &'a QueryRecordSet,
}

fn main() -> Result<()> {
    // Skipped lines are reported on stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Parse {
            file,
            glue,
            json,
            highlight,
        }) => {
            let scheme = glue.scheme()?;
            let lines = read_lines(file.as_ref())?;
            let queries = build_queries(&lines, &scheme);
            tracing::debug!(lines = lines.len(), queries = queries.len(), "Parsed statement log");

            if json {
                let report = ParseReport {
                    query_count: queries.len(),
                    time: queries.total_time(),
                    queries: &queries,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_table(&queries, highlight);
            }
        }
        Some(Commands::Format { sql }) => {
            println!("{}", format_sql(&sql));
        }
        Some(Commands::Emit {
            sql,
            time,
            memory,
            connection,
            glue,
        }) => {
            let scheme = glue.scheme()?;
            let record = QueryRecord::new(connection, sql, time, memory);
            println!("{}", render_log_line(&record, &scheme));
        }
        None => {
            println!("Querylens CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn read_lines(file: Option<&PathBuf>) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let lines = reader
        .lines()
        .collect::<io::Result<Vec<_>>>()
        .context("Failed to read statement log")?;
    Ok(lines.into_iter().filter(|line| !line.trim().is_empty()).collect())
}

fn print_table(queries: &QueryRecordSet, highlight: bool) {
    println!("{:>4}  {:<12} {:>10} {:>12}  SQL", "#", "CONNECTION", "TIME", "MEMORY");
    for (index, record) in queries.iter().enumerate() {
        let sql = if highlight {
            format_sql(&record.sql)
        } else {
            record.sql.clone()
        };
        println!(
            "{index:>4}  {:<12} {:>10} {:>12}  {sql}",
            record.connection, record.time, record.memory
        );
    }
    println!("{}", summary(queries));
}

fn summary(queries: &QueryRecordSet) -> String {
    format!("{} queries in {} s", queries.len(), queries.total_time())
}
