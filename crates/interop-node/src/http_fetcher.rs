//! # HTTP Oracle Fetcher
//!
//! [`OracleFetcher`] over a blocking `reqwest` client. Oracle polling runs on
//! the blocking pool, so the client never enters an async context.
//!
//! Bodies are read through a bounded reader: a declared `Content-Length`
//! above the limit is refused before reading, and an undeclared body stops
//! one byte past it.

use qc_15_interop::ports::{FetchError, OracleFetcher};
use reqwest::blocking::Client;
use reqwest::Url;
use std::io::Read;
use std::time::Duration;

/// Fetches oracle content over HTTP(S).
pub struct HttpOracleFetcher {
    client: Client,
    max_content_bytes: usize,
}

impl HttpOracleFetcher {
    /// Create a client with a per-request `timeout` and body limit.
    pub fn new(timeout: Duration, max_content_bytes: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("qc-15-interop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            max_content_bytes,
        })
    }
}

impl OracleFetcher for HttpOracleFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let url = Url::parse(url).map_err(|_| FetchError::InvalidUrl)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl);
        }

        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let limit = self.max_content_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::TooLarge { limit });
        }

        let mut body = Vec::new();
        response
            .take(limit as u64 + 1)
            .read_to_end(&mut body)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::TimedOut {
                    FetchError::Timeout
                } else {
                    FetchError::Unreachable(e.to_string())
                }
            })?;
        if body.len() > limit {
            return Err(FetchError::TooLarge { limit });
        }
        Ok(body)
    }
}
