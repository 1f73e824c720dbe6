use std::sync::{Arc, Mutex};

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

use crate::config::LikesConfig;
use crate::errors::BoardError;
use crate::events::{LikeDispatcher, Transaction};
use crate::models::like_event::LikeEvent;
use crate::services::materializer::{LikeMaterializer, Materialized};

/// Event queue plus the worker pool that drains it.
pub struct LikePipeline {
    dispatcher: LikeDispatcher,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl LikePipeline {
    /// Must be called within a tokio runtime.
    pub fn start(materializer: Arc<LikeMaterializer>, config: &LikesConfig) -> Self {
        let config = config.clone().normalized();
        let (dispatcher, receiver) = LikeDispatcher::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = tokio::spawn(run_workers(materializer, receiver, config.worker_count, shutdown_rx));

        info!(
            "Like pipeline started: {} workers, queue capacity {}",
            config.worker_count, config.queue_capacity
        );

        Self {
            dispatcher,
            shutdown: Mutex::new(Some(shutdown_tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn begin(&self) -> Transaction {
        Transaction::begin(&self.dispatcher)
    }

    /// Stops accepting events, then waits until queued and in-flight events finish.
    pub async fn shutdown(&self) -> Result<(), BoardError> {
        let shutdown = self.shutdown.lock().map_err(|e| BoardError::InternalServerError(e.to_string()))?.take();
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(());
        }

        let worker = self.worker.lock().map_err(|e| BoardError::InternalServerError(e.to_string()))?.take();
        if let Some(worker) = worker {
            worker
                .await
                .map_err(|e| BoardError::InternalServerError(format!("Like worker pool panicked: {}", e)))?;
        }

        Ok(())
    }
}

async fn run_workers(
    materializer: Arc<LikeMaterializer>,
    mut receiver: mpsc::Receiver<LikeEvent>,
    worker_count: usize,
    mut shutdown: oneshot::Receiver<()>,
) {
    let slots = Arc::new(Semaphore::new(worker_count));
    let mut tasks = JoinSet::new();
    let mut closing = false;

    loop {
        let event = tokio::select! {
            event = receiver.recv() => event,
            _ = &mut shutdown, if !closing => {
                closing = true;
                receiver.close();
                continue;
            }
        };

        let Some(event) = event else {
            break;
        };

        // a slot stays taken for the whole materialization, delay included
        let Ok(slot) = slots.clone().acquire_owned().await else {
            break;
        };

        let materializer = materializer.clone();
        tasks.spawn(async move {
            let _slot = slot;
            handle_event(&materializer, event).await;
        });

        while let Some(res) = tasks.try_join_next() {
            log_join_error(res);
        }
    }

    while let Some(res) = tasks.join_next().await {
        log_join_error(res);
    }

    info!("Like pipeline stopped");
}

async fn handle_event(materializer: &LikeMaterializer, event: LikeEvent) {
    match materializer.materialize(&event).await {
        Ok(Materialized::Created(like_id)) => {
            debug!("Like {} materialized for post {}", like_id, event.post_id);
        }
        Ok(Materialized::AlreadyLiked) => {
            debug!(
                "Like event {} skipped: {} already likes post {}",
                event.id, event.liker_id, event.post_id
            );
        }
        Ok(Materialized::Duplicate) => {}
        Err(BoardError::PostNotFound(post_id)) => {
            warn!("Like event {} dropped: post {} not found", event.id, post_id);
        }
        Err(e) => {
            error!("Failed to materialize like event {}: {}", event.id, e);
        }
    }
}

fn log_join_error(res: Result<(), tokio::task::JoinError>) {
    if let Err(e) = res {
        error!("Like worker task failed: {}", e);
    }
}
