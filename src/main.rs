use anyhow::{bail, Context, Result};
use crossterm::style::Stylize;
use perk_filter::config::Config;
use perk_filter::utils::logging::{init_tracing, LogRingBuffer};
use perk_filter::{Catalog, EngineOptions, FilterEngine, HttpCatalog, StaticCatalog};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

mod table_display;

use table_display::display_state;

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    url: Option<String>,
    fixture: Option<PathBuf>,
    generate_config: bool,
    help: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .with_context(|| format!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--url" => parsed.url = Some(value("--url")?),
            "--fixture" => parsed.fixture = Some(PathBuf::from(value("--fixture")?)),
            "--generate-config" => parsed.generate_config = true,
            "--help" | "-h" => parsed.help = true,
            other => bail!("Unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

fn print_usage() {
    println!("{}", "perk-filter - browse and filter the perks catalog".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  perk-filter [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}    - Load settings from this file", "--config <PATH>".green());
    println!("  {}        - Override catalog.base_url", "--url <BASE>".green());
    println!("  {} - Serve perks from a JSON file instead", "--fixture <FILE>".green());
    println!("  {}  - Print a commented default config", "--generate-config".green());
    println!();
    print_commands();
}

fn print_commands() {
    println!("{}", "Commands:".yellow());
    println!("  {}    - Filter by perk name", "name <text>".green());
    println!("  {} - Filter by merchant id (ANY for all)", "merchant <id>".green());
    println!("  {}          - Reset both filters", "clear".green());
    println!("  {}        - Re-run the current filters now", "refresh".green());
    println!("  {}           - Show the current results", "show".green());
    println!("  {}      - List merchant ids to filter by", "merchants".green());
    println!("  {}       - Show recent log entries", "logs [n]".green());
    println!("  {}           - Show this help", "help".green());
    println!("  {}           - Exit", "quit".green());
}

fn build_catalog(args: &CliArgs, config: &Config) -> Result<Arc<dyn Catalog>> {
    if let Some(fixture) = &args.fixture {
        return Ok(Arc::new(StaticCatalog::load(fixture)?));
    }

    let mut catalog_config = config.catalog.clone();
    if let Some(url) = &args.url {
        catalog_config.base_url = url.clone();
    }
    Ok(Arc::new(HttpCatalog::from_config(&catalog_config)?))
}

fn show(engine: &FilterEngine) {
    display_state(&engine.display_state());
    if let Some(remaining) = engine.pending_commit() {
        println!(
            "{}",
            format!(
                "typing… {} applies in {}ms",
                engine.criteria(),
                remaining.as_millis()
            )
            .dark_yellow()
        );
    }
}

async fn list_merchants(catalog: &dyn Catalog) {
    match catalog.merchants().await {
        Ok(merchants) if merchants.is_empty() => {
            println!("{}", "No merchants in the catalog".yellow())
        }
        Ok(merchants) => {
            println!("{}", "Merchants:".yellow());
            for merchant in merchants {
                println!("  {}", merchant.green());
            }
        }
        Err(e) => println!("{}", format!("Could not list merchants: {:#}", e).red()),
    }
}

/// Returns false when the shell should exit
async fn handle_line(
    line: &str,
    engine: &FilterEngine,
    catalog: &dyn Catalog,
    logs: &LogRingBuffer,
) -> Result<bool> {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

    match command {
        "" => {}
        "name" => engine.set_name_query(rest)?,
        "merchant" => {
            let id = rest.trim();
            engine.set_merchant(if id.is_empty() { "ANY" } else { id })?
        }
        "clear" => engine.clear()?,
        "refresh" => engine.refresh()?,
        "show" => show(engine),
        "merchants" => list_merchants(catalog).await,
        "logs" => {
            let count = rest.trim().parse().unwrap_or(20);
            for entry in logs.get_recent(count) {
                println!("{}", entry.format_for_display().dark_grey());
            }
        }
        "help" => print_commands(),
        "quit" | "exit" => return Ok(false),
        other => println!("{}", format!("Unknown command: {} (try `help`)", other).red()),
    }
    Ok(true)
}

async fn run_shell(
    engine: FilterEngine,
    catalog: Arc<dyn Catalog>,
    logs: LogRingBuffer,
) -> Result<()> {
    let mut display = engine.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if !handle_line(&line, &engine, catalog.as_ref(), &logs).await? {
                    break;
                }
            }
            changed = display.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = display.borrow_and_update().clone();
                if !state.is_loading {
                    display_state(&state);
                }
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    if args.help {
        print_usage();
        return Ok(());
    }
    if args.generate_config {
        print!("{}", Config::create_default_with_comments());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let logs = init_tracing(&config.logging.level, config.logging.max_entries)?;
    for warning in config.warnings() {
        warn!(target: "config", "{}", warning);
        println!("{}", warning.yellow());
    }

    let catalog = build_catalog(&args, &config)?;
    println!("{} {}", "Catalog:".yellow(), catalog.describe());
    print_commands();

    let engine = FilterEngine::spawn(Arc::clone(&catalog), EngineOptions::from(&config.engine));
    run_shell(engine, catalog, logs).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CliArgs> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["--url", "http://perks.local", "--fixture", "perks.json"]).unwrap();
        assert_eq!(parsed.url.as_deref(), Some("http://perks.local"));
        assert_eq!(parsed.fixture, Some(PathBuf::from("perks.json")));
        assert!(!parsed.help);
    }

    #[test]
    fn test_parse_args_rejects_unknown_and_missing_values() {
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["--config"]).is_err());
    }
}
