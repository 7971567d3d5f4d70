//! Accessor seams between the sync engines and the remote services.

use async_trait::async_trait;

use crate::models::{Bot, Download, Package};
use crate::types::ClientError;

use super::api::RequestFilePayload;

/// Lists the transfers currently known to the download manager.
#[async_trait]
pub trait DownloadSource: Send + Sync {
    async fn fetch_downloads(&self) -> Result<Vec<Download>, ClientError>;
}

/// Runs a package search for a single query.
#[async_trait]
pub trait PackageSearch: Send + Sync {
    async fn search_packages(&self, query: &str) -> Result<Vec<Package>, ClientError>;
}

#[async_trait]
pub trait BotDirectory: Send + Sync {
    async fn fetch_bots(&self) -> Result<Vec<Bot>, ClientError>;
}

/// Hands a file request over to the download manager.
#[async_trait]
pub trait FileRequestSink: Send + Sync {
    async fn submit_request(&self, payload: &RequestFilePayload) -> Result<(), ClientError>;
}
