use once_cell::unsync::OnceCell;
use serde_json::Value;
use tracing::info;

use crate::error::FetchError;
use crate::fpl_fetch::FplFetcher;
use crate::http_client::Transport;

/// Fetch-once memo for the two argument-free resources.
///
/// Entries are filled on first use and live as long as the cache does; there is no
/// invalidation. A failed fetch leaves the slot empty so the next call tries again.
#[derive(Debug, Default)]
pub struct SessionCache {
    bootstrap: OnceCell<Value>,
    fixtures: OnceCell<Value>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bootstrap<T: Transport>(&self, fetcher: &FplFetcher<T>) -> Result<&Value, FetchError> {
        self.bootstrap.get_or_try_init(|| {
            info!("fetching bootstrap resource");
            fetcher.fetch_bootstrap()
        })
    }

    pub fn fixtures<T: Transport>(&self, fetcher: &FplFetcher<T>) -> Result<&Value, FetchError> {
        self.fixtures.get_or_try_init(|| {
            info!("fetching fixtures resource");
            fetcher.fetch_fixtures()
        })
    }

    pub fn is_warm(&self) -> bool {
        self.bootstrap.get().is_some() && self.fixtures.get().is_some()
    }
}
