use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::types::ClientError;

/// Thin JSON-over-HTTP wrapper bound to one service base URL.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.get_json_with_query(path, &()).await
    }

    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = join_url(&self.base_url, path);
        trace!(url = %url, "GET");
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(ClientError::Http)?;

        if !response.status().is_success() {
            return Err(ClientError::Remote(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        response.json::<T>().await.map_err(ClientError::Http)
    }

    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = join_url(&self.base_url, path);
        trace!(url = %url, "POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Http)?;

        if !response.status().is_success() {
            return Err(ClientError::Remote(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn joins_without_doubled_slashes() {
        assert_eq!(
            join_url("https://api.nibl.co.uk/nibl/", "/search"),
            "https://api.nibl.co.uk/nibl/search"
        );
        assert_eq!(
            join_url("http://localhost:1337", "downloads"),
            "http://localhost:1337/downloads"
        );
    }
}
