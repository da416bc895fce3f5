use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Client as HttpClient;
use tokio::sync::RwLock;

use crate::models::Recommendation;
use crate::services::RecommendationsConsumer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    /// Client used to proxy recommendation images
    pub http_client: HttpClient,
    /// Lets the image proxy reach loopback, private and link-local hosts
    pub allow_private_image_hosts: bool,
}

/// Latest snapshot shown to the display layer
#[derive(Default)]
pub struct AppStateInner {
    pub recommendations: Vec<Recommendation>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates an empty state, before any snapshot has been published
    pub fn new() -> Self {
        Self::with_client(HttpClient::new())
    }

    pub fn with_client(http_client: HttpClient) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner::default())),
            http_client,
            allow_private_image_hosts: false,
        }
    }

    pub fn allow_private_image_hosts(mut self, allow: bool) -> Self {
        self.allow_private_image_hosts = allow;
        self
    }
}

#[async_trait::async_trait]
impl RecommendationsConsumer for AppState {
    async fn on_recommendations_updated(&mut self, items: &[Recommendation]) {
        let mut inner = self.inner.write().await;
        inner.recommendations = items.to_vec();
        inner.updated_at = Some(Utc::now());

        tracing::info!(items = items.len(), "Display snapshot replaced");
    }
}
