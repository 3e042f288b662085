use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, instrument, warn};

use crate::{IconError, ImageCache, model::icon_url};

pub const DEFAULT_ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Loads condition icons through the shared [`ImageCache`].
///
/// Concurrent loads of the same icon are single-flight: callers queue on a
/// per-URL lock, and whoever acquires it after the first download finds the
/// bytes already cached. A failed download, or a response that is not
/// `image/*`, caches nothing.
#[derive(Debug)]
pub struct IconLoader {
    http: Client,
    base_url: String,
    cache: Arc<ImageCache>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl IconLoader {
    pub fn new(base_url: impl Into<String>, cache: Arc<ImageCache>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }

    pub fn url_for(&self, icon: &str) -> String {
        icon_url(&self.base_url, icon)
    }

    #[instrument(skip(self))]
    pub async fn load(&self, icon: &str) -> Result<Bytes, IconError> {
        let url = self.url_for(icon);

        if let Some(hit) = self.cache.get(&url) {
            debug!(%url, "Icon cache hit");
            return Ok(hit);
        }

        let key_lock = {
            let mut in_flight = self.in_flight.lock();
            Arc::clone(in_flight.entry(url.clone()).or_default())
        };
        let _guard = key_lock.lock().await;

        // Another caller may have finished the download while we waited.
        if let Some(hit) = self.cache.get(&url) {
            debug!(%url, "Icon cached while waiting");
            return Ok(hit);
        }

        let bytes = self.download(&url).await.inspect_err(|e| {
            warn!(%url, error = %e, "Icon download failed");
        })?;
        self.cache.put(url, bytes.clone());

        Ok(bytes)
    }

    async fn download(&self, url: &str) -> Result<Bytes, IconError> {
        debug!(%url, "Downloading icon");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| IconError::Request(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(IconError::Status(status.as_u16()));
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(IconError::NotAnImage(content_type));
        }

        res.bytes().await.map_err(|e| IconError::Request(e.to_string()))
    }
}
