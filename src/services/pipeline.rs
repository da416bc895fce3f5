use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    db::CacheStore,
    error::AppResult,
    models::Recommendation,
    services::{
        decoder::decode_envelope, presentation::PresentationContext,
        providers::RecommendationSource, ranking::rank_and_filter,
    },
};

/// Cache-first recommendation pipeline
///
/// Publishes the cached snapshot (if any) straight away, then performs exactly
/// one network refresh. A refresh that fails at any step leaves the last
/// published snapshot in place and is only logged.
pub struct FetchPipeline {
    source: Arc<dyn RecommendationSource>,
    store: CacheStore,
    presentation: PresentationContext,
    limit: usize,
}

impl FetchPipeline {
    pub fn new(
        source: Arc<dyn RecommendationSource>,
        store: CacheStore,
        presentation: PresentationContext,
        limit: usize,
    ) -> Self {
        Self {
            source,
            store,
            presentation,
            limit,
        }
    }

    /// Publishes the cached snapshot, then spawns the network refresh
    ///
    /// The cache load runs on the caller before the refresh is spawned, so a
    /// cached snapshot always reaches the consumer ahead of the refreshed one.
    pub fn start(self) -> JoinHandle<()> {
        self.load_cached();
        tokio::spawn(async move { self.run_refresh().await })
    }

    /// Loads the cache and publishes it when present
    pub fn load_cached(&self) {
        match self.store.load() {
            Some(items) => {
                tracing::info!(items = items.len(), "Publishing cached recommendations");
                self.publish(items);
            }
            None => {
                tracing::info!(path = %self.store.path().display(), "No cached recommendations");
            }
        }
    }

    /// Fetches, decodes and ranks a fresh list without persisting or publishing it
    pub async fn refresh(&self) -> AppResult<Vec<Recommendation>> {
        let body = self.source.fetch().await?;
        let envelope = decode_envelope(&body)?;
        let candidates = envelope.items.len();

        let items = rank_and_filter(envelope.items, &envelope.owned, &envelope.skipped, self.limit);

        tracing::info!(
            candidates = candidates,
            kept = items.len(),
            limit = self.limit,
            source = self.source.name(),
            "Recommendations ranked"
        );

        Ok(items)
    }

    /// Runs one refresh: persist and publish on success, log and keep the
    /// current snapshot on failure
    pub async fn run_refresh(&self) {
        match self.refresh().await {
            Ok(items) => {
                self.persist(&items).await;
                self.publish(items);
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    source = self.source.name(),
                    "Recommendation refresh failed, keeping last snapshot"
                );
            }
        }
    }

    /// Hands a complete snapshot to the presentation context
    pub fn publish(&self, items: Vec<Recommendation>) {
        self.presentation.publish(items);
    }

    /// Best-effort cache write on the blocking pool; failures are logged only
    async fn persist(&self, items: &[Recommendation]) {
        let store = self.store.clone();
        let snapshot = items.to_vec();

        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to cache recommendations");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache write task failed");
            }
        }
    }
}
