use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::http_client::Transport;

/// Issues GETs against the two fixed FPL endpoints.
pub struct FplFetcher<T> {
    transport: T,
    bootstrap_url: String,
    fixtures_url: String,
}

impl<T: Transport> FplFetcher<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self {
            transport,
            bootstrap_url: config.bootstrap_url(),
            fixtures_url: config.fixtures_url(),
        }
    }

    /// GET `url` and parse the body as JSON. Any non-2xx status is a `FetchError::Status`;
    /// there is no retry.
    pub fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!(url, "fetching");
        let resp = self.transport.get(url)?;
        if !resp.is_success() {
            warn!(url, status = resp.status, "non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status,
            });
        }
        serde_json::from_str(resp.body.trim()).map_err(|err| FetchError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
    }

    pub fn fetch_bootstrap(&self) -> Result<Value, FetchError> {
        self.fetch_json(&self.bootstrap_url)
    }

    pub fn fetch_fixtures(&self) -> Result<Value, FetchError> {
        self.fetch_json(&self.fixtures_url)
    }
}
