use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::info;

use crate::config::Config;
use crate::models::{Package, Snapshot};
use crate::remote::{
    AnimuxdClient, BotDirectory, DownloadSource, FileRequestSink, NiblClient, PackageSearch,
};
use crate::store::Store;
use crate::sync::{
    DownloadSync, DownloadSyncHandle, DownloadViews, FileRequester, SearchCoordinator, SearchState,
};
use crate::types::ClientError;

/// Remote accessors the hub drives.
pub struct Sources {
    pub downloads: Arc<dyn DownloadSource>,
    pub search: Arc<dyn PackageSearch>,
    pub bots: Arc<dyn BotDirectory>,
    pub requests: Arc<dyn FileRequestSink>,
}

/// Owns every piece of client state and the engines writing into it.
///
/// Consumers get read handles (`downloads()`, `views()`, `search_state()`)
/// and subscribe through them; only the engines publish.
pub struct SyncHub {
    downloads: Store<Snapshot>,
    views: DownloadViews,
    search: SearchCoordinator,
    requester: FileRequester,
    download_source: Arc<dyn DownloadSource>,
    poll_interval: Duration,
    download_sync: Option<DownloadSyncHandle>,
    runtime: Handle,
}

impl SyncHub {
    /// Builds a hub talking to the services named in `config`.
    pub fn connect(config: &Config) -> Result<Self, ClientError> {
        let animuxd = Arc::new(AnimuxdClient::new(config)?);
        let nibl = Arc::new(NiblClient::new(config)?);
        info!(
            animuxd = %animuxd.base_url(),
            nibl = %nibl.base_url(),
            "Connecting sync hub"
        );

        let sources = Sources {
            downloads: animuxd.clone(),
            search: nibl.clone(),
            bots: nibl,
            requests: animuxd,
        };
        Ok(Self::with_sources(sources, config.poll_interval()))
    }

    /// Wires `sources` into fresh stores. The hub's engines run on the Tokio
    /// runtime current at this call, whichever thread later drives them.
    pub fn with_sources(sources: Sources, poll_interval: Duration) -> Self {
        let runtime = Handle::current();
        let downloads = Store::default();
        Self {
            views: DownloadViews::new(downloads.clone()),
            search: SearchCoordinator::with_runtime(
                sources.search,
                Store::default(),
                runtime.clone(),
            ),
            requester: FileRequester::new(sources.bots, sources.requests),
            download_source: sources.downloads,
            downloads,
            poll_interval,
            download_sync: None,
            runtime,
        }
    }

    /// Starts polling downloads. Does nothing if polling is already active.
    pub fn activate_downloads(&mut self) {
        if self
            .download_sync
            .as_ref()
            .is_some_and(DownloadSyncHandle::is_active)
        {
            return;
        }
        let engine = DownloadSync::new(
            Arc::clone(&self.download_source),
            self.downloads.clone(),
            self.poll_interval,
        )
        .on_runtime(self.runtime.clone());
        self.download_sync = Some(engine.start());
    }

    pub fn deactivate_downloads(&mut self) {
        if let Some(handle) = self.download_sync.take() {
            handle.stop();
        }
    }

    pub fn downloads(&self) -> &Store<Snapshot> {
        &self.downloads
    }

    pub fn views(&self) -> &DownloadViews {
        &self.views
    }

    pub fn search(&self) -> &SearchCoordinator {
        &self.search
    }

    pub fn search_state(&self) -> &Store<SearchState> {
        self.search.store()
    }

    pub async fn request_file(&self, package: &Package) -> Result<(), ClientError> {
        self.requester.request_file(package).await
    }

    /// Deactivates both engines and waits for the poll loop to exit.
    pub async fn shutdown(mut self) {
        self.search.close();
        if let Some(handle) = self.download_sync.take() {
            handle.shutdown().await;
        }
        info!("Sync hub shut down");
    }
}
