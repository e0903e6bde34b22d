//! # Zakatinator CLI
//!
//! Runs the calculation engine over a JSON inventory file and keeps a local
//! history of results and payments.
//!
//! ## Usage
//! ```bash
//! # Print a report for an inventory file
//! zakatinator calculate --input household.json
//!
//! # Pin the reference date and store the result
//! zakatinator calculate --input household.json --as-of 2025-06-01 --save
//!
//! # Review saved calculations and record a payment
//! zakatinator history
//! zakatinator pay --calculation calc_1234 --amount 150
//!
//! # JSON Schema of the input and result documents
//! zakatinator schema
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Deserialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use zakatinator::prelude::*;

mod config_loader;

use config_loader::CliConfig;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Zakat calculator for itemised household wealth
#[derive(Parser, Debug)]
#[command(name = "zakatinator")]
#[command(version)]
#[command(about = "Itemised Zakat calculation with history and payments", long_about = None)]
struct Args {
    /// Enable file logging to the logs/ directory
    #[arg(long, global = true, default_value = "false")]
    log: bool,

    /// History file (overrides the config file)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate Zakat for an inventory file
    Calculate {
        /// JSON file with settings, inventory, deductions, exchangeRates and metalPrices
        #[arg(long)]
        input: PathBuf,

        /// Reference date for the due date (defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Gold price per gram in base currency (overrides the input file)
        #[arg(long)]
        gold_price: Option<Decimal>,

        /// Silver price per gram in base currency (overrides the input file)
        #[arg(long)]
        silver_price: Option<Decimal>,

        /// Print the result as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Stamp the result and store it in the history
        #[arg(long, default_value = "false")]
        save: bool,
    },

    /// List saved calculations with paid and outstanding amounts
    History {
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Record a payment against a saved calculation
    Pay {
        #[arg(long)]
        calculation: String,

        #[arg(long)]
        amount: Decimal,

        /// Payment currency (defaults to the calculation's base currency)
        #[arg(long)]
        currency: Option<Currency>,

        /// Payment date, YYYY-MM-DD (defaults to now)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Print the JSON Schema of the input and result documents
    Schema,
}

/// The `--input` document. Missing keys take the built-in defaults.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
struct CalculationInput {
    settings: ZakatSettings,
    inventory: Vec<InventoryItem>,
    deductions: Vec<DeductionItem>,
    exchange_rates: ExchangeRates,
    metal_prices: MetalPrices,
}

impl Default for CalculationInput {
    fn default() -> Self {
        Self {
            settings: ZakatSettings::default(),
            inventory: Vec::new(),
            deductions: Vec::new(),
            exchange_rates: ExchangeRates::eur_defaults(),
            metal_prices: MetalPrices::default(),
        }
    }
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Zakat Due")]
    zakat_due: String,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Outstanding")]
    outstanding: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = CliConfig::load();

    let _file_guard = match init_tracing(args.log || config.logging_enabled()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let history_path = args
        .history
        .clone()
        .unwrap_or_else(|| config.resolved_history_path());
    debug!("Using history file {:?}", history_path);

    match run(args.command, &history_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Console logs go to stderr so that `--json` output stays parseable.
fn init_tracing(to_file: bool) -> CliResult<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zakatinator=info"));
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !to_file {
        tracing_subscriber::registry().with(env_filter).with(console).init();
        return Ok(None);
    }

    std::fs::create_dir_all("logs")?;
    let file_appender = tracing_appender::rolling::daily("logs", "zakatinator.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!("--- Zakatinator session started [{}] ---", Utc::now());
    Ok(Some(guard))
}

fn run(command: Commands, history_path: &Path) -> CliResult<()> {
    match command {
        Commands::Calculate { input, as_of, gold_price, silver_price, json, save } => {
            run_calculate(&input, as_of, gold_price, silver_price, json, save, history_path)
        }
        Commands::History { json } => run_history(json, history_path),
        Commands::Pay { calculation, amount, currency, date, notes } => {
            run_pay(calculation, amount, currency, date, notes, history_path)
        }
        Commands::Schema => run_schema(),
    }
}

fn load_input(path: &Path) -> CliResult<CalculationInput> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_input(&content).map_err(|e| format!("Failed to load {}: {}", path.display(), e).into())
}

/// Settings go through `ZakatSettings::from_str` so that bad tags and
/// out-of-range values surface as configuration errors.
fn parse_input(content: &str) -> CliResult<CalculationInput> {
    let mut document: serde_json::Value = serde_json::from_str(content)?;
    let settings = match document.as_object_mut().and_then(|fields| fields.remove("settings")) {
        Some(value) => value.to_string().parse::<ZakatSettings>()?,
        None => CalculationInput::default().settings,
    };

    let mut input: CalculationInput = serde_json::from_value(document)?;
    input.settings = settings;
    Ok(input)
}

fn run_calculate(
    input_path: &Path,
    as_of: Option<NaiveDate>,
    gold_price: Option<Decimal>,
    silver_price: Option<Decimal>,
    json: bool,
    save: bool,
    history_path: &Path,
) -> CliResult<()> {
    let mut input = load_input(input_path)?;
    if gold_price.is_some() || silver_price.is_some() {
        input.metal_prices = MetalPrices::new(
            gold_price.unwrap_or(input.metal_prices.gold_per_gram),
            silver_price.unwrap_or(input.metal_prices.silver_per_gram),
        )?;
    }

    let mut calculator = ZakatCalculator::new(&input.settings, &input.exchange_rates, &input.metal_prices);
    if let Some(date) = as_of {
        calculator = calculator.as_of(date);
    }
    let snapshot = calculator.calculate(&input.inventory, &input.deductions)?;
    let result = CalculationResult::stamp(snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_text(&result));
        let headline = format!("Zakat due: {:.2} {}", result.snapshot.zakat_due, result.base_currency());
        if result.snapshot.is_due() {
            println!("\n{}", headline.green().bold());
        } else {
            println!("\n{}", "Below nisab: no Zakat due".yellow().bold());
        }
    }

    if save {
        let store = HistoryStore::new(history_path);
        let mut history = store.load()?;
        if history.ensure_saved(result.clone()) {
            store.save(&history)?;
        }
        info!(id = %result.id, path = ?history_path, "Calculation saved");
        if !json {
            println!("Saved as {}", result.id.cyan());
        }
    }

    Ok(())
}

fn run_history(json: bool, history_path: &Path) -> CliResult<()> {
    let history = HistoryStore::new(history_path).load()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.calculations.is_empty() {
        println!("{}", "No saved calculations.".dimmed());
        return Ok(());
    }

    let rows: Vec<HistoryRow> = history
        .calculations
        .iter()
        .map(|calc| {
            let base = calc.base_currency();
            HistoryRow {
                id: calc.id.clone(),
                date: calc.timestamp.format("%Y-%m-%d").to_string(),
                status: calc.snapshot.status.to_string(),
                zakat_due: format!("{:.2} {}", calc.snapshot.zakat_due, base),
                paid: format!("{:.2} {}", history.total_paid(&calc.id), base),
                outstanding: format!("{:.2} {}", history.outstanding(&calc.id).unwrap_or(Decimal::ZERO), base),
            }
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}

fn run_pay(
    calculation: String,
    amount: Decimal,
    currency: Option<Currency>,
    date: Option<NaiveDate>,
    notes: Option<String>,
    history_path: &Path,
) -> CliResult<()> {
    let store = HistoryStore::new(history_path);
    let mut history = store.load()?;

    let base = history
        .calculation(&calculation)
        .map(|calc| calc.base_currency())
        .ok_or_else(|| format!("No calculation '{}' in {}", calculation, history_path.display()))?;

    let mut draft = PaymentDraft::new(calculation.clone(), amount, currency.unwrap_or(base))?;
    if let Some(day) = date {
        draft = draft.paid_on(Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN)));
    }
    if let Some(notes) = notes {
        draft = draft.with_notes(notes);
    }

    let payment = history.add_payment(draft)?.clone();
    store.save(&history)?;

    println!("Recorded {} ({:.2} {})", payment.id.cyan(), payment.amount, payment.currency);
    if let Some(outstanding) = history.outstanding(&calculation) {
        println!("Outstanding: {:.2} {}", outstanding, base);
    }
    Ok(())
}

fn run_schema() -> CliResult<()> {
    let schema = serde_json::json!({
        "input": schemars::schema_for!(CalculationInput),
        "result": schemars::schema_for!(CalculationResult),
    });
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_defaults() {
        let input: CalculationInput = serde_json::from_str("{}").unwrap();
        assert!(input.inventory.is_empty());
        assert_eq!(input.exchange_rates, ExchangeRates::eur_defaults());
        assert_eq!(input.metal_prices, MetalPrices::default());
    }

    #[test]
    fn test_input_storage_format() {
        let json = r#"{
            "settings": {"baseCurrency": "EUR", "nisabMode": "GOLD", "calendar": "GREGORIAN"},
            "inventory": [
                {"id": "1", "label": "Bank", "type": "CASH", "currency": "EUR", "amount": 10000}
            ],
            "metalPrices": {"goldPerGram": 60, "silverPerGram": 0.7}
        }"#;
        let input: CalculationInput = serde_json::from_str(json).unwrap();
        let snap = ZakatCalculator::new(&input.settings, &input.exchange_rates, &input.metal_prices)
            .as_of(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .calculate(&input.inventory, &input.deductions)
            .unwrap();
        assert_eq!(snap.zakat_due, Decimal::new(25000, 2));
    }

    #[test]
    fn test_unknown_nisab_mode_is_configuration_error() {
        let json = r#"{"settings": {"baseCurrency": "EUR", "nisabMode": "PLATINUM"}}"#;
        let err = parse_input(json).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ZakatError>(),
            Some(ZakatError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_out_of_range_rounding_is_configuration_error() {
        let json = r#"{"settings": {"baseCurrency": "EUR", "rounding": 40}}"#;
        let err = parse_input(json).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ZakatError>(),
            Some(ZakatError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_parse_input_keeps_settings() {
        let json = r#"{"settings": {"baseCurrency": "USD", "nisabMode": "SILVER"}, "inventory": []}"#;
        let input = parse_input(json).unwrap();
        assert_eq!(input.settings.base_currency, Currency::Usd);
        assert_eq!(input.settings.nisab_mode, NisabMode::Silver);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["zakatinator", "pay", "--calculation", "calc_1", "--amount", "12.5", "--currency", "usd"])
            .unwrap();
        match args.command {
            Commands::Pay { amount, currency, .. } => {
                assert_eq!(amount, Decimal::new(125, 1));
                assert_eq!(currency, Some(Currency::Usd));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
