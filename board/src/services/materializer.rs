use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, warn};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::{sleep, timeout};
use uuid::Uuid;

use crate::config::LikesConfig;
use crate::errors::BoardError;
use crate::models::like_event::LikeEvent;
use crate::resources::count_cache::{like_count_key, CountCache};
use crate::resources::like_store::LikeStore;
use crate::resources::post_lookup::PostLookup;
use crate::services::dirty_posts::DirtyPosts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    Created(Uuid),
    /// Liker already has a like on the post and duplicates are disabled.
    AlreadyLiked,
    /// Event id was seen before.
    Duplicate,
}

type LikerKey = (Uuid, String);

/// Serializes check-then-write for one liker on one post. The map entry is
/// removed once no other task holds or waits on it.
struct LikerLock<'a> {
    locks: &'a DashMap<LikerKey, Arc<Mutex<()>>>,
    key: LikerKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LikerLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Turns committed like events into a cache increment plus a durable like row.
pub struct LikeMaterializer {
    posts: Arc<dyn PostLookup>,
    like_store: Arc<dyn LikeStore>,
    cache: Arc<dyn CountCache>,
    config: LikesConfig,
    processed: DashMap<Uuid, Instant>,
    liker_locks: DashMap<LikerKey, Arc<Mutex<()>>>,
    dirty_posts: DirtyPosts,
}

impl LikeMaterializer {
    pub fn new(
        posts: Arc<dyn PostLookup>,
        like_store: Arc<dyn LikeStore>,
        cache: Arc<dyn CountCache>,
        config: LikesConfig,
        dirty_posts: DirtyPosts,
    ) -> Self {
        Self {
            posts,
            like_store,
            cache,
            config: config.normalized(),
            processed: DashMap::new(),
            liker_locks: DashMap::new(),
            dirty_posts,
        }
    }

    pub fn dirty_posts(&self) -> &DirtyPosts {
        &self.dirty_posts
    }

    pub async fn materialize(&self, event: &LikeEvent) -> Result<Materialized, BoardError> {
        let delay = self.config.materialize_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }

        if !self.claim(event.id) {
            debug!("Like event {} already materialized", event.id);

            return Ok(Materialized::Duplicate);
        }

        let res = self.apply(event).await;

        // failed events may be redelivered
        if res.is_err() {
            self.processed.remove(&event.id);
        }

        res
    }

    /// Forgets processed event ids older than `retention`.
    pub fn prune_processed(&self, retention: Duration) -> usize {
        let before = self.processed.len();
        self.processed.retain(|_, seen_at| seen_at.elapsed() < retention);

        before.saturating_sub(self.processed.len())
    }

    async fn apply(&self, event: &LikeEvent) -> Result<Materialized, BoardError> {
        let lookup_timeout = self.config.lookup_timeout();

        let post = self
            .with_retry("post lookup", lookup_timeout, || self.posts.find_post_by_id(event.post_id))
            .await?
            .ok_or(BoardError::PostNotFound(event.post_id))?;

        // held until the like row is written
        let _liker_lock = match self.config.allow_duplicate_likes {
            true => None,
            false => Some(self.lock_liker(post.id, &event.liker_id).await),
        };

        if !self.config.allow_duplicate_likes {
            let liked = self
                .with_retry("like lookup", lookup_timeout, || {
                    self.like_store.like_exists(post.id, &event.liker_id)
                })
                .await?;

            if liked {
                return Ok(Materialized::AlreadyLiked);
            }
        }

        // cache first, then likes table
        if let Err(e) = self.increment_cache(post.id).await {
            warn!("Like count cache increment failed for post {}: {}", post.id, e);
            self.dirty_posts.mark(post.id);
        }

        let like_id = self
            .with_retry("like insert", self.config.write_timeout(), || {
                self.like_store.insert_like(post.id, &event.liker_id)
            })
            .await
            .map_err(|e| {
                self.dirty_posts.mark(post.id);

                BoardError::DurableWriteFailure {
                    post_id: post.id,
                    source: Box::new(e),
                }
            })?;

        Ok(Materialized::Created(like_id))
    }

    async fn increment_cache(&self, post_id: Uuid) -> Result<(), BoardError> {
        timeout(self.config.cache_timeout(), self.cache.increment(&like_count_key(post_id))).await?
    }

    async fn lock_liker(&self, post_id: Uuid, liker_id: &str) -> LikerLock<'_> {
        let key = (post_id, liker_id.to_string());
        let lock = Arc::clone(&self.liker_locks.entry(key.clone()).or_default());

        LikerLock {
            locks: &self.liker_locks,
            key,
            guard: Some(lock.lock_owned().await),
        }
    }

    fn claim(&self, event_id: Uuid) -> bool {
        match self.processed.entry(event_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(Instant::now());
                true
            }
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, deadline: Duration, mut f: F) -> Result<T, BoardError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BoardError>>,
    {
        let mut attempt = 1;

        loop {
            let res = match timeout(deadline, f()).await {
                Ok(res) => res,
                Err(_) => Err(BoardError::Timeout(format!("{} exceeded {:?}", operation, deadline))),
            };

            match res {
                Err(e) if e.is_retryable() && attempt < self.config.max_attempts => {
                    warn!(
                        "{} failed (attempt {}/{}): {}",
                        operation, attempt, self.config.max_attempts, e
                    );

                    sleep(self.config.retry_backoff() * attempt).await;
                    attempt += 1;
                }
                res => return res,
            }
        }
    }
}
