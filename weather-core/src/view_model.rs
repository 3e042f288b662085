use std::sync::Arc;

use tokio::{runtime::Handle, sync::watch, task::AbortHandle};
use tracing::{debug, warn};

use crate::{WeatherError, WeatherFetcher, WeatherQuery, WeatherResult};

/// Lifecycle of a single fetch. `Resolved` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Pending,
    Resolved(WeatherResult),
    Failed(WeatherError),
}

impl FetchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FetchState::Pending)
    }

    pub fn weather(&self) -> Option<&WeatherResult> {
        match self {
            FetchState::Resolved(weather) => Some(weather),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WeatherError> {
        match self {
            FetchState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Owns one fetch for one query and publishes its outcome.
///
/// The fetch starts on construction. The state is retained in a watch channel,
/// so observers that subscribe after the fetch finished still read the result;
/// observers that subscribed earlier are woken on the single transition.
#[derive(Debug)]
pub struct WeatherViewModel {
    query: WeatherQuery,
    state: Arc<watch::Sender<FetchState>>,
    task: Option<AbortHandle>,
}

impl WeatherViewModel {
    /// Bind a view-model to `query` and start fetching it.
    ///
    /// A malformed query fails with [`WeatherError::InvalidQuery`] right here,
    /// without calling the fetcher. Otherwise the fetch is spawned onto the
    /// current Tokio runtime; without one the view-model fails with
    /// [`WeatherError::Unknown`]. A panicking fetch also settles as `Unknown`.
    pub fn new(fetcher: Arc<dyn WeatherFetcher>, query: WeatherQuery) -> Self {
        let (tx, _) = watch::channel(FetchState::Pending);
        let state = Arc::new(tx);

        if let Err(err) = query.validate() {
            warn!(%query, "Rejecting malformed query");
            settle(&state, FetchState::Failed(err));
            return Self { query, state, task: None };
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!(%query, "No Tokio runtime to run the weather fetch on");
            settle(&state, FetchState::Failed(WeatherError::Unknown));
            return Self { query, state, task: None };
        };

        let task_query = query.clone();
        let fetch = runtime.spawn(async move { fetcher.fetch(&task_query).await });
        let task = fetch.abort_handle();

        let task_state = Arc::clone(&state);
        let supervised_query = query.clone();
        runtime.spawn(async move {
            let outcome = match fetch.await {
                Ok(Ok(weather)) => FetchState::Resolved(weather),
                Ok(Err(err)) => {
                    warn!(query = %supervised_query, error = %err, "Weather fetch failed");
                    FetchState::Failed(err)
                }
                Err(join_err) if join_err.is_panic() => {
                    warn!(query = %supervised_query, "Weather fetch panicked");
                    FetchState::Failed(WeatherError::Unknown)
                }
                // Cancelled: stays Pending.
                Err(_) => return,
            };
            settle(&task_state, outcome);
        });

        Self { query, state, task: Some(task) }
    }

    pub fn query(&self) -> &WeatherQuery {
        &self.query
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        !self.state.borrow().is_terminal()
    }

    pub fn weather(&self) -> Option<WeatherResult> {
        self.state.borrow().weather().cloned()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().error().map(ToString::to_string)
    }

    /// Receiver that is marked changed when the fetch settles.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Wait for the terminal state.
    ///
    /// Never returns for a view-model whose fetch was cancelled.
    pub async fn settled(&self) -> FetchState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(FetchState::is_terminal).await {
            Ok(state) => state.clone(),
            // The sender lives as long as `self`.
            Err(_) => self.state(),
        }
    }

    /// Abort the in-flight fetch, leaving the state `Pending`.
    ///
    /// Navigation never calls this: a fetch superseded by navigating away runs
    /// to completion and updates a view-model nobody observes.
    pub fn cancel(&self) {
        if let Some(task) = &self.task {
            debug!(query = %self.query, "Cancelling weather fetch");
            task.abort();
        }
    }
}

/// Move `Pending` to a terminal state. Returns `false`, leaving the state
/// untouched, if it was already terminal.
fn settle(state: &watch::Sender<FetchState>, outcome: FetchState) -> bool {
    state.send_if_modified(|current| {
        if current.is_terminal() {
            return false;
        }
        *current = outcome;
        true
    })
}
