use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};
use weather_core::{Config, Coordinates};

use crate::app::App;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Look up current weather by city or coordinates")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Without a subcommand, starts the interactive search screen.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and an optional home location.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "Atlanta" or "New York".
        city: String,
    },

    /// Show current weather for a coordinate pair.
    Coords {
        /// Latitude in decimal degrees.
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        /// Longitude in decimal degrees.
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { city }) => {
                let mut app = App::from_config(&Config::load()?)?;
                app.remember_city(&city);
                app.coordinator_mut().go_to_detail(city);
                app.render_current().await
            }
            Some(Command::Coords { latitude, longitude }) => {
                let mut app = App::from_config(&Config::load()?)?;
                app.coordinator_mut().go_to_detail_by_coordinates(latitude, longitude);
                app.render_current().await
            }
            None => {
                let mut app = App::from_config(&Config::load()?)?;
                app.run_interactive().await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let set_location = Confirm::new("Set a home location for \"Use current location\"?")
        .with_default(config.location.is_some())
        .prompt()?;

    if set_location {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;
        config.location = Some(Coordinates::new(latitude, longitude));
    } else {
        config.location = None;
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["weather"]).expect("parses");
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn coords_accept_negative_values() {
        let cli = Cli::try_parse_from(["weather", "coords", "33.749", "-84.388"]).expect("parses");

        match cli.command {
            Some(Command::Coords { latitude, longitude }) => {
                assert_eq!(latitude, 33.749);
                assert_eq!(longitude, -84.388);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_takes_multi_word_city_and_global_verbosity() {
        let cli = Cli::try_parse_from(["weather", "show", "New York", "-vv"]).expect("parses");

        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Command::Show { city }) if city == "New York"));
    }
}
