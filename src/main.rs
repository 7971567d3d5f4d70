use std::sync::Arc;

use animux_client::{ClientError, Config, SearchState, SyncHub};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "animux-client failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ClientError> {
    let config = Config::load().await;
    let mut hub = SyncHub::connect(&config)?;

    let views = hub.views();
    views.subscribe(|summary| {
        info!(
            speed_bps = summary.total_current_speed,
            downloading = summary.downloading.len(),
            waiting = summary.waiting.len(),
            done = summary.done_count,
            failed = summary.failed_count,
            "Downloads updated"
        );
    });
    hub.downloads().subscribe(|snapshot| {
        for download in snapshot.iter() {
            info!(
                file = %download.file_name,
                status = %download.status,
                progress = %format!("{:.2}%", download.progress_percent()),
                "Download"
            );
        }
    });
    hub.search_state().subscribe(|state: &Arc<SearchState>| {
        if !state.loading && !state.query.is_empty() {
            info!("{} - {} results", state.query, state.results.len());
        }
    });

    hub.activate_downloads();
    for query in std::env::args().skip(1) {
        hub.search().submit(&query)?;
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    hub.shutdown().await;
    Ok(())
}
