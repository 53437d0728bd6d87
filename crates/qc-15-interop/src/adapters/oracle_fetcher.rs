//! # Static Oracle Fetcher
//!
//! [`OracleFetcher`] serving canned responses per URL.

use crate::ports::{FetchError, OracleFetcher};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// URL -> canned content or failure.
#[derive(Default)]
pub struct StaticOracleFetcher {
    responses: RwLock<HashMap<String, Result<Vec<u8>, FetchError>>>,
    calls: AtomicUsize,
}

impl StaticOracleFetcher {
    /// Create with no responses (every URL is unreachable).
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `url`.
    pub fn set_response(&self, url: &str, content: impl Into<Vec<u8>>) {
        self.responses
            .write()
            .insert(url.to_string(), Ok(content.into()));
    }

    /// Fail every fetch of `url` with `error`.
    pub fn set_failure(&self, url: &str, error: FetchError) {
        self.responses.write().insert(url.to_string(), Err(error));
    }

    /// Fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl OracleFetcher for StaticOracleFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.responses
            .read()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Unreachable("no response configured".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_responses() {
        let fetcher = StaticOracleFetcher::new();
        fetcher.set_response("https://a", b"42".to_vec());
        fetcher.set_failure("https://b", FetchError::HttpStatus(503));

        assert_eq!(fetcher.fetch("https://a").unwrap(), b"42");
        assert_eq!(fetcher.fetch("https://b"), Err(FetchError::HttpStatus(503)));
        assert!(matches!(fetcher.fetch("https://c"), Err(FetchError::Unreachable(_))));
        assert_eq!(fetcher.calls(), 3);
    }
}
