//! Test doubles shared by the unit tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{WeatherError, WeatherFetcher, WeatherQuery, WeatherResult};

pub(crate) fn atlanta() -> WeatherResult {
    WeatherResult {
        name: "Atlanta".to_string(),
        temperature_celsius: 25.0,
        humidity_percent: 60,
        condition_icon: Some("01d".to_string()),
        condition_description: Some("Clear sky".to_string()),
        observed_at: None,
    }
}

/// Fetcher that returns a canned outcome and records every query it sees.
#[derive(Debug)]
pub(crate) struct MockFetcher {
    outcome: Result<WeatherResult, WeatherError>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<WeatherQuery>>,
}

impl MockFetcher {
    pub(crate) fn returning(outcome: Result<WeatherResult, WeatherError>) -> Self {
        Self {
            outcome,
            gate: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Like [`MockFetcher::returning`], but each fetch waits for `gate` first.
    pub(crate) fn gated(outcome: Result<WeatherResult, WeatherError>, gate: Arc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::returning(outcome) }
    }

    pub(crate) fn called(&self) -> bool {
        self.call_count() > 0
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<WeatherQuery> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl WeatherFetcher for MockFetcher {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.outcome.clone()
    }
}
