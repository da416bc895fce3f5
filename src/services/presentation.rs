use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{AppError, AppResult};
use crate::models::Recommendation;

/// Receiver of complete recommendation snapshots
///
/// Called only from the presentation task, one snapshot at a time, in publish order.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationsConsumer: Send {
    async fn on_recommendations_updated(&mut self, items: &[Recommendation]);
}

/// Handle used to marshal snapshots onto the presentation task
///
/// The task owns the consumer and the current recommendation list. Each
/// published snapshot replaces that list wholesale before the consumer is
/// notified, and snapshots are delivered in the order they were published.
#[derive(Clone)]
pub struct PresentationContext {
    publish_tx: mpsc::UnboundedSender<Vec<Recommendation>>,
}

/// Handle for gracefully shutting down the presentation task
pub struct PresentationHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl PresentationHandle {
    /// Stops the presentation task after delivering every queued snapshot
    pub async fn shutdown(self) -> AppResult<()> {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Presentation shutdown signal sent");

        self.task
            .await
            .map_err(|e| AppError::Internal(format!("Presentation task failed: {}", e)))
    }
}

impl PresentationContext {
    /// Spawns the presentation task that drives `consumer`
    ///
    /// The task stops when [`PresentationHandle::shutdown`] is called or, if the
    /// handle is dropped instead, once every `PresentationContext` clone is gone.
    pub fn spawn(consumer: impl RecommendationsConsumer + 'static) -> (Self, PresentationHandle) {
        let (publish_tx, publish_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            Self::presentation_task(Box::new(consumer), publish_rx, shutdown_rx).await;
        });

        (Self { publish_tx }, PresentationHandle { shutdown_tx, task })
    }

    /// Queues a full snapshot for delivery on the presentation task
    pub fn publish(&self, items: Vec<Recommendation>) {
        if let Err(e) = self.publish_tx.send(items) {
            tracing::error!(error = %e, "Presentation task is gone, snapshot dropped");
        }
    }

    async fn presentation_task(
        mut consumer: Box<dyn RecommendationsConsumer>,
        mut publish_rx: mpsc::UnboundedReceiver<Vec<Recommendation>>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Presentation task started");
        let mut current: Vec<Recommendation> = Vec::new();
        let mut handle_dropped = false;

        loop {
            tokio::select! {
                biased;
                published = publish_rx.recv() => match published {
                    Some(items) => {
                        current = items;
                        consumer.on_recommendations_updated(&current).await;
                    }
                    None => {
                        tracing::debug!("All publishers gone, presentation task stopping");
                        break;
                    }
                },
                signal = shutdown_rx.recv(), if !handle_dropped => match signal {
                    Some(()) => {
                        while let Ok(items) = publish_rx.try_recv() {
                            current = items;
                            consumer.on_recommendations_updated(&current).await;
                        }
                        break;
                    }
                    // Without a handle the task serves until the last publisher is dropped
                    None => handle_dropped = true,
                },
            }
        }

        tracing::info!(items = current.len(), "Presentation task stopped");
    }
}
