use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};

use fpl_stats::config::Config;
use fpl_stats::fpl_fetch::FplFetcher;
use fpl_stats::http_client::ReqwestTransport;
use fpl_stats::snapshot::{SnapshotError, save_snapshot};

fn main() -> Result<ExitCode> {
    let config = Config::from_env();
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();

    let path = parse_out_arg().unwrap_or_else(|| config.snapshot_path.clone());
    let transport = ReqwestTransport::new(config.timeout)?;
    let fetcher = FplFetcher::new(transport, &config);

    println!("Fetching FPL data...");
    match save_snapshot(&fetcher, &path) {
        Ok(data) => {
            let players = data
                .get("elements")
                .and_then(|v| v.as_array())
                .map(Vec::len)
                .unwrap_or(0);
            println!("Data saved to {} ({players} players)", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(SnapshotError::Fetch(err)) => {
            match err.status() {
                Some(status) => println!("Failed to fetch data. Status code: {status}"),
                None => println!("Failed to fetch data: {err}"),
            }
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err).with_context(|| format!("snapshot to {}", path.display())),
    }
}

fn parse_out_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--out=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--out" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
