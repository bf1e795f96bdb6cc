use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};

use crate::{
    error::{ListingError, Result},
    source::ListingSource,
    types::ListingPayload,
};

/// HTTP-backed listing source
///
/// Issues `GET <origin><logical-path>` and decodes the JSON body.
#[derive(Clone)]
pub struct HttpListingSource {
    client: Client,
    origin: String,
}

impl HttpListingSource {
    /// Create a new HTTP source
    ///
    /// # Arguments
    /// * `origin` - Base URL of the listing service, e.g. `http://host:8080`
    /// * `timeout` - Per-request timeout
    pub fn new(origin: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(concat!("dirlist-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, origin }
    }

    /// Build the request URL for a logical path
    fn listing_url(&self, logical_path: &str) -> String {
        format!(
            "{}/{}",
            self.origin.trim_end_matches('/'),
            logical_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_listing(&self, logical_path: &str) -> Result<ListingPayload> {
        let url = self.listing_url(logical_path);
        tracing::debug!(%url, "requesting listing");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: Bytes = response.bytes().await?;
                Ok(serde_json::from_slice(&body)?)
            }
            status => Err(transport_error(status)),
        }
    }

    fn identifier(&self) -> String {
        format!("http:{}", self.origin)
    }
}

fn transport_error(status: StatusCode) -> ListingError {
    ListingError::Transport {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}
