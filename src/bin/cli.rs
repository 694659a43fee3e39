//! Filmboard CLI
//!
//! One-shot operations against the configured collection:
//! - Check the connection
//! - Print a table snapshot
//! - Print the chart specs
//! - Generate a config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use filmboard::config::{generate_default_config, Config};
use filmboard::pipeline::{CycleOutcome, Dashboard, TableState};
use filmboard::source::{demo_records, redact_uri, DocumentSource, MongoSource, StaticSource};
use filmboard::table::{ExportFormat, Table};

#[derive(Parser)]
#[command(name = "filmboard-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect the collection behind a Filmboard dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use the built-in sample collection
    #[arg(long, global = true)]
    pub demo: bool,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a sample document to verify the connection
    Check,

    /// Print the materialized table
    Snapshot,

    /// Print the chart specs derived from the table
    Charts,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let config = Config::load_default(cli.config.as_deref())?;
    config.validate()?;

    let source: Arc<dyn DocumentSource> = if cli.demo {
        Arc::new(StaticSource::new(demo_records()).with_name("demo.Films"))
    } else {
        Arc::new(MongoSource::from_config(&config.source)?)
    };

    let result = run(&cli, &config, Arc::clone(&source)).await;
    source.shutdown().await;
    result
}

async fn run(cli: &Cli, config: &Config, source: Arc<dyn DocumentSource>) -> anyhow::Result<()> {
    match cli.command {
        Commands::Check => {
            if let Some(uri) = config.source.uri.as_deref().filter(|_| !cli.demo) {
                println!("Target:     {}", redact_uri(uri));
            }
            println!("Collection: {}", source.name());

            match source.sample(config.source.sample_size).await {
                Ok(sample) if sample.is_empty() => {
                    println!("Status:     connected, but no data found in the collection");
                }
                Ok(sample) => {
                    println!("Status:     connected");
                    println!();
                    println!("Sample:");
                    for record in &sample {
                        println!("  {}", serde_json::to_string(record)?);
                    }
                }
                Err(e) => {
                    eprintln!("Status:     error");
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Snapshot => {
            let dashboard = load(config, source).await?;

            match dashboard.table() {
                TableState::Ready { table } => match cli.format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&table)?),
                    "csv" => print!("{}", table.export(ExportFormat::Csv).map_err(anyhow::Error::msg)?),
                    _ => print_table(&table),
                },
                TableState::NoData { message } | TableState::Failed { message } => {
                    println!("{}", message)
                }
                TableState::Pending => println!("No data"),
            }
        }

        Commands::Charts => {
            let dashboard = load(config, source).await?;
            println!("{}", serde_json::to_string_pretty(&dashboard.charts())?);
        }

        Commands::Config { .. } => unreachable!("handled before the source is built"),
    }

    Ok(())
}

/// Run one refresh cycle and hand back the populated dashboard
async fn load(config: &Config, source: Arc<dyn DocumentSource>) -> anyhow::Result<Dashboard> {
    let dashboard = Dashboard::from_config(source, config);

    if let CycleOutcome::Failed { error } = dashboard.refresh().await {
        bail!("Refresh failed: {}", error);
    }

    Ok(dashboard)
}

fn print_table(table: &Table) {
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .map(|column| {
            table
                .rows()
                .iter()
                .filter_map(|row| row.get(&column.id))
                .map(|v| v.to_display_string().chars().count())
                .chain(std::iter::once(column.name.chars().count()))
                .max()
                .unwrap_or(0)
                .min(40)
        })
        .collect();

    // Header
    let header: Vec<String> = table
        .columns()
        .iter()
        .zip(&widths)
        .map(|(column, w)| format!("{:<w$}", column.name, w = *w))
        .collect();
    println!("{}", header.join(" | "));

    // Separator
    let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    println!("{}", "-".repeat(total));

    // Data rows
    for row in table.rows() {
        let cells: Vec<String> = table
            .columns()
            .iter()
            .zip(&widths)
            .map(|(column, w)| {
                let text = row
                    .get(&column.id)
                    .map(|v| v.to_display_string())
                    .unwrap_or_default();
                format!("{:<w$}", truncate(&text, *w), w = *w)
            })
            .collect();
        println!("{}", cells.join(" | "));
    }

    println!();
    println!("{} rows, {} columns", table.row_count(), table.column_count());
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}
