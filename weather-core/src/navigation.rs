use std::{fmt, sync::Arc};

use tracing::info;

use crate::{WeatherFetcher, WeatherQuery, WeatherViewModel};

/// The top-level screen currently shown. Exactly one is current at a time.
#[derive(Debug, Clone)]
pub enum Screen {
    Search,
    /// Detail screen for the view-model's query; the view-model is created
    /// fresh for every transition.
    Detail(Arc<WeatherViewModel>),
}

impl Screen {
    pub fn is_search(&self) -> bool {
        matches!(self, Screen::Search)
    }

    pub fn view_model(&self) -> Option<&Arc<WeatherViewModel>> {
        match self {
            Screen::Search => None,
            Screen::Detail(vm) => Some(vm),
        }
    }

    pub fn query(&self) -> Option<&WeatherQuery> {
        self.view_model().map(|vm| vm.query())
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Search => f.write_str("search"),
            Screen::Detail(vm) => write!(f, "detail for {}", vm.query()),
        }
    }
}

type Listener = Box<dyn FnMut(&Screen) + Send>;

/// Owns the current [`Screen`] and switches between search and detail.
///
/// Transitions are synchronous and run on the single thread driving the UI.
/// Listeners are called in registration order after every screen replacement.
pub struct NavigationCoordinator {
    fetcher: Arc<dyn WeatherFetcher>,
    current: Screen,
    listeners: Vec<Listener>,
}

impl fmt::Debug for NavigationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationCoordinator")
            .field("fetcher", &self.fetcher)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl NavigationCoordinator {
    /// Start on the search screen. Does no asynchronous work.
    pub fn new(fetcher: Arc<dyn WeatherFetcher>) -> Self {
        Self {
            fetcher,
            current: Screen::Search,
            listeners: Vec::new(),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.current
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Screen) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Show the search screen. A no-op when it is already showing.
    pub fn go_to_search(&mut self) {
        if self.current.is_search() {
            return;
        }
        self.replace(Screen::Search);
    }

    /// Show the detail screen for `city`, starting a fresh fetch.
    pub fn go_to_detail(&mut self, city: impl Into<String>) {
        self.show_detail(WeatherQuery::ByCity(city.into()));
    }

    /// Show the detail screen for a coordinate pair, starting a fresh fetch.
    pub fn go_to_detail_by_coordinates(&mut self, latitude: f64, longitude: f64) {
        self.show_detail(WeatherQuery::ByCoordinates { latitude, longitude });
    }

    fn show_detail(&mut self, query: WeatherQuery) {
        let view_model = WeatherViewModel::new(Arc::clone(&self.fetcher), query);
        self.replace(Screen::Detail(Arc::new(view_model)));
    }

    fn replace(&mut self, next: Screen) {
        info!(screen = %next, "Navigating");
        self.current = next;
        for listener in &mut self.listeners {
            listener(&self.current);
        }
    }
}
