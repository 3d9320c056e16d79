pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod fpl_fetch;
pub mod http_client;
pub mod metrics;
pub mod provider;
pub mod rankings;
pub mod session_cache;
pub mod snapshot;
pub mod state;
pub mod tables;
