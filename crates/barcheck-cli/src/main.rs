mod alert;
mod commands;
mod export;
mod logging;

use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

use alert::TerminalAlerts;
use barcheck_core::{
    parse_start_value, AppConfig, ModelRegistry, ScanEngine, ScanOutcome, ScanRecord, ScanStore,
};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use tracing::{error, info, warn};

const RESET_COMMAND: &str = ":reset";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match barcheck_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Scan { start, shift }) => run_scan(&config, start.as_deref(), shift),
        Some(Commands::Recent { limit }) => {
            let store = ScanStore::open_default(&config);
            print_records(&store.get_recent(limit.unwrap_or(config.recent_limit)));
            Ok(())
        }
        Some(Commands::Range { from, to, limit }) => run_range(&config, &from, &to, limit),
        Some(Commands::Search { text, limit }) => {
            let store = ScanStore::open_default(&config);
            print_records(&store.search_by_barcode(&text, limit.unwrap_or(config.query_limit)));
            Ok(())
        }
        Some(Commands::Count) => {
            let store = ScanStore::open_default(&config);
            println!("{} records", store.count());
            Ok(())
        }
        Some(Commands::Export { year, month, out }) => {
            let store = ScanStore::open_default(&config);
            let records = store.get_by_month(year, month, config.query_limit);
            let path = out.unwrap_or_else(|| export::default_export_path(year, month));
            export::export_to_file(&path, &records)
                .map(|count| println!("{} records written to {}", count, path.display()))
                .map_err(Into::into)
        }
        Some(Commands::Prune { days }) => run_prune(&config, days),
        Some(Commands::Delete {
            barcode,
            timestamp_display,
            result,
        }) => {
            let store = ScanStore::open_default(&config);
            if store.delete_by_natural_key(&barcode, &timestamp_display, &result) {
                println!("Record deleted");
            } else {
                println!("No matching record");
            }
            Ok(())
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            println!("Database: {}", config.database_path().display());
            let registry = ModelRegistry::from_config(&config.models);
            for model in registry.models() {
                println!("Model {}: {}", model.name, model.pattern);
            }
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {}", err);
    }

    Ok(())
}

fn run_scan(
    config: &AppConfig,
    start: Option<&str>,
    shift: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let start_value = match start {
        Some(text) => parse_start_value(text)?,
        None => config.start_value,
    };

    let mut engine = ScanEngine::from_config(config)
        .with_start_value(start_value)
        .with_alerts(Arc::new(TerminalAlerts));
    if let Some(shift) = shift {
        engine = engine.with_shift(&shift);
    }

    info!(
        "Scanning against {} models, STT starts at {}",
        engine.registry().len(),
        engine.start_value()
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == RESET_COMMAND {
            engine.reset_session();
            println!("{}", "Session reset".yellow());
            continue;
        }

        match engine.process(input) {
            Ok(record) => print_scan(&record),
            Err(err) => warn!("Scan rejected: {}", err),
        }
        io::stdout().flush()?;
    }

    info!("{} scans processed", engine.working_set().len());
    Ok(())
}

fn run_range(
    config: &AppConfig,
    from: &str,
    to: &str,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let from = parse_date(from)?;
    let to = parse_date(to)?;
    let store = ScanStore::open_default(config);
    print_records(&store.get_by_date_range(from, to, limit.unwrap_or(config.query_limit)));
    Ok(())
}

fn run_prune(config: &AppConfig, days: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(days) = days.or(config.retention_days) else {
        return Err("no retention window given (use --days or retention_days)".into());
    };

    let prompt = format!("Delete every record older than {} days?", days);
    if !prompt_confirm(&prompt, Some(false))? {
        return Ok(());
    }

    let store = ScanStore::open_default(config);
    println!("{} records deleted", store.delete_old_records(days));
    Ok(())
}

fn parse_date(text: &str) -> Result<NaiveDate, barcheck_core::Error> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| barcheck_core::Error::Validation(format!("'{}' is not a YYYY-MM-DD date", text)))
}

fn print_scan(record: &ScanRecord) {
    let result = match ScanOutcome::from_label(&record.result) {
        Some(ScanOutcome::Ok) => record.result.green().bold(),
        Some(ScanOutcome::Duplicate) => record.result.red().bold(),
        _ => record.result.yellow().bold(),
    };
    println!("{:>6}  {:<24}  {}", record.sequence_number, record.barcode, result);
}

fn print_records(records: &[ScanRecord]) {
    for record in records {
        println!(
            "{:>8}  {:>6}  {:<24}  {:<20}  {:<14}  {}",
            record.id,
            record.sequence_number,
            record.barcode,
            record.timestamp_display,
            record.result,
            record.shift
        );
    }
    println!("{}", format!("{} records", records.len()).cyan());
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(" 2024-03-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_date("01/03/2024").is_err());
    }
}
