use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::time::timeout;
use uuid::Uuid;

use crate::errors::BoardError;
use crate::resources::count_cache::{like_count_key, CountCache};
use crate::resources::like_store::LikeStore;

/// Read side of like counts: cache first, likes table on miss.
#[derive(Clone)]
pub struct LikeCounter {
    like_store: Arc<dyn LikeStore>,
    cache: Arc<dyn CountCache>,
    cache_timeout: Duration,
}

impl LikeCounter {
    pub fn new(like_store: Arc<dyn LikeStore>, cache: Arc<dyn CountCache>, cache_timeout: Duration) -> Self {
        Self {
            like_store,
            cache,
            cache_timeout,
        }
    }

    /// A cache fault never fails the read; only the likes table can.
    pub async fn count_like(&self, post_id: Uuid) -> Result<i64, BoardError> {
        let key = like_count_key(post_id);

        match self.cached_count(&key).await {
            Ok(Some(count)) => return Ok(count),
            Ok(None) => {}
            Err(e) => warn!(
                "Like count cache read failed for post {}, counting from likes table: {}",
                post_id, e
            ),
        }

        let count = self.like_store.count_likes_by_post(post_id).await?;

        if let Err(e) = self.store_count(&key, count).await {
            warn!("Failed to populate like count cache for post {}: {}", post_id, e);
        }

        Ok(count)
    }

    /// Overwrites the cached count with the likes table aggregate.
    pub async fn reconcile(&self, post_id: Uuid) -> Result<i64, BoardError> {
        let count = self.like_store.count_likes_by_post(post_id).await?;

        self.store_count(&like_count_key(post_id), count).await?;

        info!("Reconciled like count of post {} to {}", post_id, count);

        Ok(count)
    }

    async fn cached_count(&self, key: &str) -> Result<Option<i64>, BoardError> {
        timeout(self.cache_timeout, self.cache.get_integer(key)).await?
    }

    async fn store_count(&self, key: &str, count: i64) -> Result<(), BoardError> {
        timeout(self.cache_timeout, self.cache.set_integer(key, count)).await?
    }
}
