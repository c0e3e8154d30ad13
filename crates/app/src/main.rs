use std::path::{Path, PathBuf};

use api_types::trip::TripFile;
use clap::{Args, Parser, Subcommand};
use engine::{Expense, ExpenseDraft, MoneyCents, SplitRequest, compute_balances};

use crate::{
    error::{AppError, Result},
    settings::{Format, Settings},
};

mod convert;
mod error;
mod report;
mod settings;

#[derive(Parser, Debug)]
#[command(name = "tripsplit")]
#[command(about = "Split shared trip expenses and compute who owes whom")]
struct Cli {
    /// Optional settings file (TOML).
    #[arg(long, env = "TRIPSPLIT_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the net balance of every member of a trip.
    Balances(BalancesArgs),
    /// Preview how an expense would be split among the members of a trip.
    Split(SplitArgs),
}

#[derive(Args, Debug)]
struct BalancesArgs {
    /// Trip file (JSON) with roster and expenses.
    #[arg(long)]
    file: PathBuf,
    #[arg(long, value_enum)]
    format: Option<Format>,
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// Trip file (JSON) providing the roster.
    #[arg(long)]
    file: PathBuf,
    /// Expense total, e.g. `100` or `12,50`.
    #[arg(long)]
    total: String,
    #[arg(long)]
    payer: String,
    /// Comma separated member ids for an equal split.
    #[arg(long, value_delimiter = ',')]
    participants: Vec<String>,
    /// Comma separated `<member>=<amount>` pairs for a custom split (use `.` for decimals).
    #[arg(long, value_delimiter = ',', conflicts_with = "participants")]
    custom: Vec<String>,
    /// Attribute the whole expense to the payer.
    #[arg(long, conflicts_with_all = ["participants", "custom"])]
    personal: bool,
    #[arg(long, value_enum)]
    format: Option<Format>,
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tripsplit={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Balances(args) => balances(&settings, args),
        Command::Split(args) => split(&settings, args),
    };

    match result {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(err) => {
            match err.engine_error() {
                Some(engine_err) if !engine_err.is_validation() => {
                    tracing::error!("trip data is corrupted: {engine_err}");
                }
                _ => tracing::debug!("command failed: {err}"),
            }
            Err(err.into())
        }
    }
}

fn read_trip_file(path: &Path) -> Result<TripFile> {
    let raw = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

fn balances(settings: &Settings, args: BalancesArgs) -> Result<String> {
    let file = read_trip_file(&args.file)?;
    let trip = convert::trip(file.trip, settings.report.default_currency)?;
    let expenses = convert::expenses(&trip, &file.expenses)?;
    tracing::info!(
        trip = %trip.name,
        members = trip.members().len(),
        expenses = expenses.len(),
        "computing balances"
    );

    let balances = compute_balances(trip.id, trip.members(), &expenses)?;
    match args.format.unwrap_or(settings.report.format) {
        Format::Table => Ok(report::balances_table(&trip, &balances)),
        Format::Json => Ok(serde_json::to_string_pretty(&convert::balances_response(
            &trip, &balances,
        ))? + "\n"),
    }
}

fn split(settings: &Settings, args: SplitArgs) -> Result<String> {
    let file = read_trip_file(&args.file)?;
    let trip = convert::trip(file.trip, settings.report.default_currency)?;
    let total: MoneyCents = args.total.parse()?;

    let request = if args.personal {
        SplitRequest::personal(total, args.payer.as_str())
    } else if !args.custom.is_empty() {
        let amounts = args
            .custom
            .iter()
            .map(|pair| parse_custom_share(pair))
            .collect::<Result<Vec<_>>>()?;
        SplitRequest::custom(total, args.payer.as_str(), amounts)
    } else {
        SplitRequest::equal(total, args.payer.as_str(), args.participants)
    };

    let expense = Expense::create(&trip, ExpenseDraft::new(request))?;
    match args.format.unwrap_or(settings.report.format) {
        Format::Table => Ok(report::split_table(&trip, &expense)),
        Format::Json => {
            Ok(serde_json::to_string_pretty(&convert::expense_view(&expense))? + "\n")
        }
    }
}

fn parse_custom_share(pair: &str) -> Result<(String, MoneyCents)> {
    let (id, amount) = pair
        .split_once('=')
        .ok_or_else(|| AppError::CustomShare(pair.to_string()))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::CustomShare(pair.to_string()));
    }
    Ok((id.to_string(), amount.parse()?))
}
