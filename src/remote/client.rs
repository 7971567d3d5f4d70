use async_trait::async_trait;

use crate::config::Config;
use crate::models::{Bot, Download, Package};
use crate::types::ClientError;

use super::api::{Content, RequestFilePayload, SearchQuery};
use super::core::http::HttpClient;
use super::source::{BotDirectory, DownloadSource, FileRequestSink, PackageSearch};

/// Client for the animuxd download manager API.
#[derive(Clone, Debug)]
pub struct AnimuxdClient {
    http: HttpClient,
}

impl AnimuxdClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Ok(Self {
            http: HttpClient::new(&config.animuxd_api_url, config.request_timeout())?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl DownloadSource for AnimuxdClient {
    async fn fetch_downloads(&self) -> Result<Vec<Download>, ClientError> {
        self.http.get_json("/downloads").await
    }
}

#[async_trait]
impl FileRequestSink for AnimuxdClient {
    async fn submit_request(&self, payload: &RequestFilePayload) -> Result<(), ClientError> {
        self.http.post_json("/downloads", payload).await
    }
}

/// Client for the NIBL package search API.
#[derive(Clone, Debug)]
pub struct NiblClient {
    http: HttpClient,
}

impl NiblClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Ok(Self {
            http: HttpClient::new(&config.nibl_api_url, config.request_timeout())?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait]
impl PackageSearch for NiblClient {
    async fn search_packages(&self, query: &str) -> Result<Vec<Package>, ClientError> {
        let envelope: Content<Package> = self
            .http
            .get_json_with_query("/search", &SearchQuery { query })
            .await?;
        Ok(envelope.content)
    }
}

#[async_trait]
impl BotDirectory for NiblClient {
    async fn fetch_bots(&self) -> Result<Vec<Bot>, ClientError> {
        let envelope: Content<Bot> = self.http.get_json("/bots").await?;
        Ok(envelope.content)
    }
}
