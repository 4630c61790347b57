//! `almanac` CLI — materialize recurring events from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Expand an event file into concrete instances (stdin → stdout)
//! cat events.json | almanac expand --from 2024-01-01 --to 2024-01-31
//!
//! # Expand from file to file, pretty-printed
//! almanac expand --from 2024-01-01 --to 2024-01-31 -i events.json -o out.json --pretty
//!
//! # Pin "today" for reproducible output (the safety horizon is today + 1 year)
//! almanac expand --from 2024-01-01 --to 2024-12-31 --now 2024-01-01 -i events.json
//!
//! # Per-date agenda listing with multi-day span markers
//! almanac agenda --from 2024-03-01 --to 2024-03-31 -i events.json
//! ```
//!
//! Input is a JSON array of events:
//!
//! ```json
//! [{"id":"standup","title":"Standup","start":"2024-01-04T09:00:00",
//!   "end":"2024-01-04T09:15:00","recurrenceRuleText":"Weekly on Thursday"}]
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, Read};

use almanac_engine::event::{Event, ViewWindow};
use almanac_engine::{aggregate, materialize_batch};

#[derive(Parser)]
#[command(
    name = "almanac",
    version,
    about = "Materialize recurring events into concrete calendar instances"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand events into a flat JSON list of instances
    Expand {
        /// Window start date (inclusive), e.g. 2024-01-01
        #[arg(long)]
        from: NaiveDate,
        /// Window end date (inclusive)
        #[arg(long)]
        to: NaiveDate,
        /// Override "today" for the safety horizon (defaults to the local date)
        #[arg(long)]
        now: Option<NaiveDate>,
        /// Input file with a JSON event array (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print a per-date agenda with multi-day span markers
    Agenda {
        /// Window start date (inclusive)
        #[arg(long)]
        from: NaiveDate,
        /// Window end date (inclusive)
        #[arg(long)]
        to: NaiveDate,
        /// Override "today" for the safety horizon (defaults to the local date)
        #[arg(long)]
        now: Option<NaiveDate>,
        /// Input file with a JSON event array (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    // Engine warnings (skipped events, unrecognized rules) go to stderr;
    // RUST_LOG controls verbosity.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Expand {
            from,
            to,
            now,
            input,
            output,
            pretty,
        } => {
            let events = read_events(input.as_deref())?;
            let window = ViewWindow::new(from, to);
            let today = now.unwrap_or_else(|| chrono::Local::now().date_naive());

            let instances = materialize_batch(&events, &window, today)
                .context("Failed to materialize events")?;

            let json = if pretty {
                serde_json::to_string_pretty(&instances)?
            } else {
                serde_json::to_string(&instances)?
            };
            write_output(output.as_deref(), &json)?;
        }
        Commands::Agenda {
            from,
            to,
            now,
            input,
        } => {
            let events = read_events(input.as_deref())?;
            let window = ViewWindow::new(from, to);
            let today = now.unwrap_or_else(|| chrono::Local::now().date_naive());

            let instances = materialize_batch(&events, &window, today)
                .context("Failed to materialize events")?;
            let aggregated = aggregate(&instances);

            for (date, entries) in &aggregated.by_date {
                println!("{}", date.format("%Y-%m-%d (%a)"));
                for entry in entries {
                    let span = match (entry.starting_day, entry.ending_day) {
                        (true, true) => "",
                        (true, false) => "  [starts]",
                        (false, true) => "  [ends]",
                        (false, false) => "  [continues]",
                    };
                    println!(
                        "  {}-{}  {}{}",
                        entry.instance.start.format("%H:%M"),
                        entry.instance.end.format("%H:%M"),
                        entry.instance.title,
                        span
                    );
                }
            }
        }
    }

    Ok(())
}

fn read_events(path: Option<&str>) -> Result<Vec<Event>> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse event JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
