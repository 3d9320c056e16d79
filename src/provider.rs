use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use tracing::{error, info};

use crate::config::Config;
use crate::error::LoadError;
use crate::export;
use crate::fpl_fetch::FplFetcher;
use crate::http_client::{ReqwestTransport, Transport};
use crate::metrics::add_points_per_million;
use crate::session_cache::SessionCache;
use crate::state::{Delta, ProviderCommand};
use crate::tables::{Tables, build_tables};

/// Fetch (through the session cache), build the tables and add the derived column.
pub fn load_tables<T: Transport>(
    fetcher: &FplFetcher<T>,
    cache: &SessionCache,
) -> Result<Tables, LoadError> {
    let bootstrap = cache.bootstrap(fetcher)?;
    let fixtures = cache.fixtures(fetcher)?;
    let mut tables = build_tables(bootstrap, fixtures)?;
    tables.players = add_points_per_million(tables.players);
    Ok(tables)
}

/// Start the background worker that owns network access. An initial load is kicked off
/// immediately; the UI learns about completion through `Delta`s.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>, config: Config) {
    thread::spawn(move || {
        let transport = match ReqwestTransport::new(config.timeout) {
            Ok(transport) => transport,
            Err(err) => {
                error!(%err, "http client unavailable");
                let _ = tx.send(Delta::LoadFailed(format!("{err:#}")));
                return;
            }
        };
        let fetcher = FplFetcher::new(transport, &config);
        run_provider(&fetcher, &SessionCache::new(), &tx, cmd_rx);
    });
}

/// Serve one initial load, then commands until the UI hangs up.
pub fn run_provider<T: Transport>(
    fetcher: &FplFetcher<T>,
    cache: &SessionCache,
    tx: &Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) {
    handle_load(fetcher, cache, tx);
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            ProviderCommand::Load => handle_load(fetcher, cache, tx),
            ProviderCommand::Export { path, sections } => {
                let result =
                    export::export_sections(&path, &sections).map_err(|err| format!("{err:#}"));
                let _ = tx.send(Delta::ExportFinished { path, result });
            }
        }
    }
    info!("provider shutting down");
}

fn handle_load<T: Transport>(fetcher: &FplFetcher<T>, cache: &SessionCache, tx: &Sender<Delta>) {
    let from_cache = cache.is_warm();
    if !from_cache {
        let _ = tx.send(Delta::Log("[INFO] Fetching FPL data".to_string()));
    }
    match load_tables(fetcher, cache) {
        Ok(tables) => {
            info!(
                players = tables.players.len(),
                teams = tables.teams.len(),
                fixtures = tables.fixtures.len(),
                from_cache,
                "tables built"
            );
            let _ = tx.send(Delta::DataLoaded { tables, from_cache });
        }
        Err(err) => {
            error!(%err, "load failed");
            let _ = tx.send(Delta::LoadFailed(err.to_string()));
        }
    }
}
