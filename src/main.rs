use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context};
use clap::Parser;

use dashplot::config::load_config;
use dashplot::data::load_all;
use dashplot::server;
use dashplot::settings::{DEFAULT_CONFIG_PATH, DEFAULT_PORT, GRAPH_DIR};
use dashplot::state::AppState;

/// Serve a line-chart dashboard described by a configuration workbook.
#[derive(Parser, Debug)]
#[command(name = "dashplot", version, about)]
struct Args {
    /// Configuration workbook
    #[arg(short = 'f', long = "configfile", default_value = DEFAULT_CONFIG_PATH)]
    configfile: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = load_config(&args.configfile)
        .with_context(|| format!("Failed to load configuration {:?}", args.configfile))?;

    let report = load_all(&config);
    if !report.is_success() {
        for file in &report.missing {
            tracing::error!("Missing datafile: {}", file);
        }
        for (file, reason) in &report.failed {
            tracing::error!("Unreadable datafile {}: {}", file, reason);
        }
        bail!(
            "{} datafile(s) missing, {} unreadable",
            report.missing.len(),
            report.failed.len()
        );
    }

    let title = config.header.page_title.clone();
    let state = AppState::new(config, report.store, Some(PathBuf::from(GRAPH_DIR)));
    let state = Arc::new(Mutex::new(state));

    let addr = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT));
    let listener = server::bind(addr).with_context(|| format!("Cannot listen on {addr}"))?;
    let server_thread = server::spawn(Arc::clone(&state), listener)
        .context("Failed to start the server thread")?;

    let url = format!("http://{addr}/");
    if let Err(e) = dashplot::host::run(title, url, state) {
        tracing::warn!("Host window unavailable ({}); serving until interrupted", e);
        match server_thread.join() {
            Ok(result) => result.context("Server stopped")?,
            Err(_) => bail!("Server thread panicked"),
        }
    }

    tracing::info!("Host window closed, shutting down");
    Ok(())
}
