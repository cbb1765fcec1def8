//! Prints one calendar month of occurrences for a JSON list of item drafts.
//!
//! Usage: `cashflow_month <items.json> [YYYY-MM]`
//!
//! Each entry is an item draft plus `"kind": "income" | "expense"` and an
//! optional `"paid"` list of occurrence dates already paid.

use std::{env, fs, path::PathBuf, process::ExitCode};

use cashflow_core::{
    config::{Config, ConfigManager},
    currency::format_amount,
    errors::TrackerError,
    ledger::{parse_iso, totals_by_currency, FinanceBook, ItemDraft, OccurrenceEntry},
};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Deserialize;

const CONFIG_ENV: &str = "CASHFLOW_CONFIG";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum InputKind {
    Income,
    Expense,
}

#[derive(Debug, Deserialize)]
struct ItemInput {
    kind: InputKind,
    #[serde(flatten)]
    draft: ItemDraft,
    #[serde(default)]
    paid: Vec<String>,
}

fn main() -> ExitCode {
    cashflow_core::init();
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!(
            "cashflow_month {} ({} {}, built {})",
            env!("CARGO_PKG_VERSION"),
            env!("CASHFLOW_CORE_BUILD_HASH"),
            env!("CASHFLOW_CORE_BUILD_PROFILE"),
            env!("CASHFLOW_CORE_BUILD_TIMESTAMP"),
        );
        return ExitCode::SUCCESS;
    }

    let Some(items_path) = args.first() else {
        eprintln!("usage: cashflow_month <items.json> [YYYY-MM]");
        return ExitCode::from(2);
    };

    match run(items_path, args.get(1).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(items_path: &str, month: Option<&str>) -> Result<(), TrackerError> {
    let config = load_config()?;
    let reference = match month {
        Some(raw) => parse_iso(&format!("{}-01", raw.trim()))?,
        None => Utc::now(),
    };

    let data = fs::read_to_string(items_path)?;
    let inputs: Vec<ItemInput> = serde_json::from_str(&data)?;
    let mut book = FinanceBook::new().with_history_window(config.history_window_months);
    for input in inputs {
        let id = match input.kind {
            InputKind::Income => book.add_income(input.draft)?,
            InputKind::Expense => book.add_expense(input.draft)?,
        };
        for raw in &input.paid {
            book.set_payment_status(id, parse_iso(raw)?, true, Utc::now())?;
        }
    }

    print_month(&config, reference, &book.month_entries(reference));
    Ok(())
}

fn load_config() -> Result<Config, TrackerError> {
    let manager = match env::var_os(CONFIG_ENV) {
        Some(path) => ConfigManager::new(PathBuf::from(path)),
        None => ConfigManager::default_location(),
    };
    manager.load()
}

fn print_month(config: &Config, reference: DateTime<Utc>, entries: &[OccurrenceEntry]) {
    println!("{}", reference.format("%B %Y").to_string().bold());
    if entries.is_empty() {
        println!("  {}", "no occurrences".dimmed());
        return;
    }
    for entry in entries {
        let amount = format_amount(&config.locale, entry.amount(), &entry.currency);
        let marker = match (entry.is_expense, entry.occurrence.is_paid()) {
            (false, _) => "+".green(),
            (true, true) => "✓".green(),
            (true, false) => "·".yellow(),
        };
        println!(
            "  {} {}  {:<24} {:>18}",
            marker,
            entry.occurrence.date.format("%a %d"),
            entry.name,
            amount
        );
    }
    println!();
    for (currency, total) in totals_by_currency(entries) {
        println!(
            "  {} {}",
            "total".bold(),
            format_amount(&config.locale, total, &currency)
        );
    }
}
