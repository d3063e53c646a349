use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Confirm, Password, Select};
use std::io::IsTerminal;

use weather_core::{Config, LoadOutcome, ReportState, Units, WeatherReporter};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferred units.
    Configure,

    /// List the configured addresses.
    Addresses,

    /// Show current weather and forecast for an address.
    Show {
        /// Address or location name; prompts for a configured one if absent.
        address: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Addresses => {
                let config = Config::load()?;
                for (i, address) in config.addresses.iter().enumerate() {
                    println!("Address {}: {address}", i + 1);
                }
                Ok(())
            }
            Command::Show { address } => show(address).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let start = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read units")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(address: Option<String>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let reporter = WeatherReporter::from_config(&config)?;

    let outcome = match address {
        Some(address) => reporter.load(&address).await,
        None => {
            let labels: Vec<String> = reporter
                .addresses()
                .iter()
                .enumerate()
                .map(|(i, a)| format!("Address {}: {a}", i + 1))
                .collect();
            anyhow::ensure!(!labels.is_empty(), "No addresses configured");

            let choice = Select::new("Choose an address:", labels)
                .raw_prompt()
                .context("Failed to read address selection")?;
            reporter.load_index(choice.index).await
        }
    };

    tracing::info!(?outcome, "report loaded");
    print_report(&reporter.snapshot());

    if let LoadOutcome::Failed(_) = outcome {
        acknowledge(&reporter)?;
    }
    Ok(())
}

fn print_report(state: &ReportState) {
    if let Some(address) = &state.address {
        println!("{address}");
        println!();
    }

    match &state.current {
        Some(current) => {
            println!("{}", current.location_text);
            println!("{}", current.condition_text);
            println!("{}", current.temperature_text);
        }
        None => println!("Report unavailable"),
    }

    if let Some(forecast) = &state.forecast {
        println!();
        println!("Forecast");
        for item in &forecast.items {
            println!(
                "  {:<20} {:>8}  {}",
                item.time_date_text, item.temperature_text, item.condition_text
            );
        }
    }
}

/// Keep the error on screen until the user dismisses it.
fn acknowledge(reporter: &WeatherReporter) -> anyhow::Result<()> {
    let Some(message) = reporter.snapshot().error_message else {
        return Ok(());
    };

    eprintln!();
    eprintln!("Error: {message}");

    if std::io::stdin().is_terminal() {
        Confirm::new("OK?")
            .with_default(true)
            .prompt()
            .context("Failed to read acknowledgment")?;
        reporter.acknowledge_error();
    }
    Ok(())
}
