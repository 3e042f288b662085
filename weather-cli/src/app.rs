use std::{fmt, sync::Arc};

use anyhow::Result;
use chrono::Local;
use inquire::{InquireError, Select, Text};
use tracing::{debug, warn};
use weather_core::{
    Config, ConfiguredLocation, FetchState, IconLoader, ImageCache, LastCityStore, LocationSource,
    NavigationCoordinator, Screen, WeatherResult, WeatherViewModel, fetcher_from_config,
};

const INVALID_CITY_MESSAGE: &str = "Please go back to Weather Search and input a valid city name";

/// Terminal front-end: renders whatever screen the coordinator holds.
#[derive(Debug)]
pub struct App {
    coordinator: NavigationCoordinator,
    icons: IconLoader,
    last_city: LastCityStore,
    location: Box<dyn LocationSource>,
}

#[derive(Debug, Clone, Copy)]
enum SearchAction {
    City,
    CurrentLocation,
    Quit,
}

impl fmt::Display for SearchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchAction::City => "Search by city",
            SearchAction::CurrentLocation => "Use current location",
            SearchAction::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum DetailAction {
    Back,
    Quit,
}

impl fmt::Display for DetailAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DetailAction::Back => "Back to Weather Search",
            DetailAction::Quit => "Quit",
        })
    }
}

impl App {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config, LastCityStore::open_default()?)
    }

    fn new(config: &Config, last_city: LastCityStore) -> Result<Self> {
        let mut coordinator = NavigationCoordinator::new(fetcher_from_config(config)?);
        coordinator.subscribe(|screen| debug!(%screen, "Screen changed"));

        Ok(Self {
            coordinator,
            icons: IconLoader::new(config.icon_base_url.clone(), Arc::new(ImageCache::new())),
            last_city,
            location: Box::new(ConfiguredLocation::from_config(config)),
        })
    }

    pub fn coordinator_mut(&mut self) -> &mut NavigationCoordinator {
        &mut self.coordinator
    }

    /// Persist the submitted city. Failing to persist never blocks a search.
    pub fn remember_city(&self, city: &str) {
        if let Err(err) = self.last_city.save(city) {
            warn!(error = %err, "Failed to save last searched city");
        }
    }

    /// Render the current screen once, without prompting.
    pub async fn render_current(&self) -> Result<()> {
        if let Screen::Detail(vm) = self.coordinator.screen() {
            self.render_detail(vm).await;
        }
        Ok(())
    }

    pub async fn run_interactive(&mut self) -> Result<()> {
        loop {
            let screen = self.coordinator.screen().clone();
            let keep_going = match screen {
                Screen::Search => self.search_screen().await?,
                Screen::Detail(vm) => {
                    self.render_detail(&vm).await;
                    self.detail_actions()?
                }
            };

            if !keep_going {
                return Ok(());
            }
        }
    }

    async fn search_screen(&mut self) -> Result<bool> {
        println!("\n== Weather Search ==");

        let actions = vec![SearchAction::City, SearchAction::CurrentLocation, SearchAction::Quit];
        let Some(action) = cancellable(Select::new("What would you like to do?", actions).prompt())?
        else {
            return Ok(false);
        };

        match action {
            SearchAction::City => {
                let last = self.last_city.load().unwrap_or_else(|err| {
                    warn!(error = %err, "Failed to load last searched city");
                    None
                });

                let mut prompt = Text::new("Enter city:");
                if let Some(last) = last.as_deref() {
                    prompt = prompt.with_initial_value(last);
                }

                let answer = cancellable(prompt.prompt())?;
                self.submit_city(answer);
            }
            SearchAction::CurrentLocation => match self.location.locate().await {
                Ok(coords) => {
                    self.coordinator.go_to_detail_by_coordinates(coords.latitude, coords.longitude)
                }
                Err(err) => println!("Error: {err}"),
            },
            SearchAction::Quit => return Ok(false),
        }

        Ok(true)
    }

    /// Esc on the city prompt leaves the user on the search screen.
    fn submit_city(&mut self, answer: Option<String>) {
        let Some(city) = answer else {
            debug!("City prompt cancelled");
            return;
        };
        self.remember_city(&city);
        self.coordinator.go_to_detail(city);
    }

    fn detail_actions(&mut self) -> Result<bool> {
        let actions = vec![DetailAction::Back, DetailAction::Quit];
        match cancellable(Select::new("", actions).prompt())? {
            Some(DetailAction::Back) => {
                self.coordinator.go_to_search();
                Ok(true)
            }
            Some(DetailAction::Quit) | None => Ok(false),
        }
    }

    async fn render_detail(&self, vm: &WeatherViewModel) {
        println!("\n== Weather for {} ==", vm.query());
        if vm.is_pending() {
            println!("Loading...");
        }

        match vm.settled().await {
            FetchState::Resolved(weather) => self.print_weather(&weather).await,
            FetchState::Failed(err) => {
                debug!(error = %err, "Fetch failed");
                println!("{INVALID_CITY_MESSAGE}");
            }
            FetchState::Pending => println!("Still loading..."),
        }
    }

    async fn print_weather(&self, weather: &WeatherResult) {
        println!("  {}", weather.name);

        if let Some(icon) = weather.condition_icon.as_deref() {
            match self.icons.load(icon).await {
                Ok(bytes) => println!("  Icon: {} ({} bytes)", self.icons.url_for(icon), bytes.len()),
                Err(err) => warn!(%icon, error = %err, "Could not load condition icon"),
            }
        }

        println!("  Temperature: {:.1}°C", weather.temperature_celsius);
        println!("  Humidity: {}%", weather.humidity_percent);

        let description = weather.description_capitalized();
        if !description.is_empty() {
            println!("  {description}");
        }

        if let Some(observed_at) = weather.observed_at {
            println!(
                "  Observed at {}",
                observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }
    }
}

/// Esc / Ctrl-C on a prompt means "leave", not an error.
fn cancellable<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(dir: &tempfile::TempDir) -> App {
        let mut config = Config::default();
        config.set_api_key("KEY".into());
        App::new(&config, LastCityStore::new(dir.path().join("last_city"))).expect("app")
    }

    #[test]
    fn cancelled_city_prompt_stays_on_search() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);

        app.submit_city(None);

        assert!(app.coordinator.screen().is_search());
        assert_eq!(app.last_city.load().expect("load"), None);
    }

    #[test]
    fn submitted_city_is_remembered_and_shown() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);

        app.submit_city(Some("Atlanta".into()));

        assert!(!app.coordinator.screen().is_search());
        assert_eq!(app.last_city.load().expect("load").as_deref(), Some("Atlanta"));
    }

    #[test]
    fn cancelled_prompt_is_none() {
        let answer: Result<u8, InquireError> = Err(InquireError::OperationCanceled);
        assert!(cancellable(answer).expect("not an error").is_none());
    }

    #[test]
    fn other_prompt_errors_propagate() {
        let answer: Result<u8, InquireError> = Err(InquireError::NotTTY);
        assert!(cancellable(answer).is_err());
    }

    #[test]
    fn action_labels_match_screens() {
        assert_eq!(SearchAction::CurrentLocation.to_string(), "Use current location");
        assert_eq!(DetailAction::Back.to_string(), "Back to Weather Search");
    }
}
