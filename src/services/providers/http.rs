use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    services::providers::RecommendationSource,
};

/// Fetches the recommendations envelope with a single HTTP GET
#[derive(Clone)]
pub struct HttpSource {
    http_client: HttpClient,
    url: String,
}

impl HttpSource {
    pub fn new(url: String) -> Self {
        Self::with_client(HttpClient::new(), url)
    }

    /// Reuses an existing client, e.g. one shared with image downloads
    pub fn with_client(http_client: HttpClient, url: String) -> Self {
        Self { http_client, url }
    }
}

#[async_trait::async_trait]
impl RecommendationSource for HttpSource {
    async fn fetch(&self) -> AppResult<Vec<u8>> {
        let response = self.http_client.get(&self.url).send().await?;

        // Any received body goes to the decoder; the status is informational only
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                url = %self.url,
                status = %status,
                "Recommendations endpoint returned a non-success status"
            );
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(AppError::ExternalApi(format!(
                "Recommendations endpoint returned an empty body (status {})",
                status
            )));
        }

        tracing::info!(
            url = %self.url,
            status = %status,
            bytes = body.len(),
            source = self.name(),
            "Recommendations fetched"
        );

        Ok(body.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
