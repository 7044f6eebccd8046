// ABOUTME: HTTP API client for the Diagram Designer server
// ABOUTME: Builds /api URLs against a configurable base and performs JSON requests

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        Ok(Self { client, base_url })
    }

    /// Underlying reqwest client, shared with status polling
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Absolute URL of an API path such as `/api/diagrams`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    pub fn diagram_url(&self, diagram_id: &str) -> String {
        self.api_url(&format!("/api/diagrams/{}", urlencoding::encode(diagram_id)))
    }

    pub fn node_details_url(&self, node_name: &str) -> String {
        self.api_url(&format!(
            "/api/node-details/{}",
            urlencoding::encode(node_name)
        ))
    }

    /// GET a URL and decode the body; non-2xx answers become `ClientError::Status`
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Status code of a GET, without reading the body
    pub async fn status_of(&self, url: &str) -> Result<StatusCode> {
        Ok(self.client.get(url).send().await?.status())
    }
}
