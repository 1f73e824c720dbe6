use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::time;

use crate::constants::{MAX_RECONCILE_BATCH, PROCESSED_EVENT_RETENTION_SECS};
use crate::services::dirty_posts::DirtyPosts;
use crate::services::like_counter::LikeCounter;
use crate::services::materializer::LikeMaterializer;

pub async fn reconcile_task(counter: LikeCounter, materializer: Arc<LikeMaterializer>, interval: Duration) {
    let mut reconcile_interval = time::interval(interval);
    let retention = Duration::from_secs(PROCESSED_EVENT_RETENTION_SECS);

    tokio::spawn(async move {
        loop {
            reconcile_interval.tick().await;

            let dirty_posts = materializer.dirty_posts();
            let reconciled = reconcile_dirty_posts(&counter, dirty_posts).await;
            let pruned = materializer.prune_processed(retention);

            if reconciled > 0 || pruned > 0 {
                info!(
                    "Reconcile task ran: {} like counts repaired, {} still dirty, {} event ids pruned",
                    reconciled,
                    dirty_posts.len(),
                    pruned
                );
            }
        }
    });
}

/// Recomputes cached counts of dirty posts. Posts that fail stay dirty.
pub async fn reconcile_dirty_posts(counter: &LikeCounter, dirty_posts: &DirtyPosts) -> usize {
    let mut reconciled = 0;

    for post_id in dirty_posts.drain(MAX_RECONCILE_BATCH) {
        match counter.reconcile(post_id).await {
            Ok(_) => reconciled += 1,
            Err(e) => {
                error!("Failed to reconcile like count of post {}: {}", post_id, e);
                dirty_posts.mark(post_id);
            }
        }
    }

    reconciled
}
