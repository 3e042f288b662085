use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

/// Process-lifetime store of downloaded icon bytes, keyed by icon URL.
///
/// No eviction and no expiry. Safe to share between concurrent downloads.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.entries.read().get(key).cloned()
    }

    pub fn put(&self, key: impl Into<String>, value: Bytes) {
        self.entries.write().insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn put_then_get_returns_value() {
        let cache = ImageCache::new();
        cache.put("https://openweathermap.org/img/wn/01d@2x.png", Bytes::from_static(b"png"));

        assert_eq!(
            cache.get("https://openweathermap.org/img/wn/01d@2x.png"),
            Some(Bytes::from_static(b"png"))
        );
    }

    #[test]
    fn missing_key_is_absent() {
        let cache = ImageCache::new();
        cache.put("a", Bytes::from_static(b"1"));

        assert_eq!(cache.get("b"), None);
        assert!(ImageCache::new().is_empty());
    }

    #[test]
    fn put_replaces_existing_value() {
        let cache = ImageCache::new();
        cache.put("a", Bytes::from_static(b"old"));
        cache.put("a", Bytes::from_static(b"new"));

        assert_eq!(cache.get("a"), Some(Bytes::from_static(b"new")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_puts_from_many_threads() {
        let cache = Arc::new(ImageCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        let key = format!("{i}-{j}");
                        cache.put(key.clone(), Bytes::from(key.clone().into_bytes()));
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(cache.len(), 400);
        assert_eq!(cache.get("3-7"), Some(Bytes::from_static(b"3-7")));
    }
}
