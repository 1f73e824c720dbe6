//! In-memory stand-ins for Scylla and Redis used by unit tests.
//!
//! Every store operation yields to the scheduler first so concurrent callers
//! interleave the way they would against a remote server.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::errors::{BoardError, RedisError};
use crate::models::like::Like;
use crate::models::post::Post;
use crate::resources::count_cache::CountCache;
use crate::resources::like_store::LikeStore;
use crate::resources::post_lookup::PostLookup;

#[derive(Default)]
pub struct MemoryPostLookup {
    posts: DashMap<Uuid, Post>,
}

impl MemoryPostLookup {
    pub fn with_post(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.posts.insert(
            id,
            Post {
                id,
                created_by: "wally".to_string(),
                title: "Hello".to_string(),
                content: "World".to_string(),
                ..Default::default()
            },
        );

        id
    }
}

#[async_trait]
impl PostLookup for MemoryPostLookup {
    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, BoardError> {
        Ok(self.posts.get(&id).map(|post| post.clone()))
    }
}

#[derive(Default)]
pub struct MemoryLikeStore {
    likes: DashMap<Uuid, Vec<Like>>,
    failing_inserts: AtomicUsize,
    count_queries: AtomicUsize,
}

impl MemoryLikeStore {
    /// The next `n` inserts fail with a transient error.
    pub fn fail_next_inserts(&self, n: usize) {
        self.failing_inserts.store(n, Ordering::SeqCst);
    }

    pub fn likes_of(&self, post_id: Uuid) -> Vec<Like> {
        self.likes.get(&post_id).map(|likes| likes.clone()).unwrap_or_default()
    }

    pub fn total_likes(&self) -> usize {
        self.likes.iter().map(|likes| likes.len()).sum()
    }

    pub fn count_queries(&self) -> usize {
        self.count_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LikeStore for MemoryLikeStore {
    async fn insert_like(&self, post_id: Uuid, liker_id: &str) -> Result<Uuid, BoardError> {
        tokio::task::yield_now().await;

        let failing = self
            .failing_inserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if failing {
            return Err(BoardError::ScyllaError("write timed out".to_string()));
        }

        let like = Like::new(post_id, liker_id);
        let id = like.id;
        self.likes.entry(post_id).or_default().push(like);

        Ok(id)
    }

    async fn count_likes_by_post(&self, post_id: Uuid) -> Result<i64, BoardError> {
        tokio::task::yield_now().await;
        self.count_queries.fetch_add(1, Ordering::SeqCst);

        Ok(self.likes_of(post_id).len() as i64)
    }

    async fn like_exists(&self, post_id: Uuid, liker_id: &str) -> Result<bool, BoardError> {
        tokio::task::yield_now().await;

        Ok(self.likes_of(post_id).iter().any(|like| like.liker_id == liker_id))
    }
}

pub struct MemoryCountCache {
    counters: DashMap<String, i64>,
    available: AtomicBool,
}

impl Default for MemoryCountCache {
    fn default() -> Self {
        Self {
            counters: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryCountCache {
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn peek(&self, key: &str) -> Option<i64> {
        self.counters.get(key).map(|value| *value)
    }

    /// Simulates an evicted or flushed key.
    pub fn clear(&self, key: &str) {
        self.counters.remove(key);
    }

    fn ensure_available(&self) -> Result<(), BoardError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BoardError::CacheUnavailable(RedisError::Unavailable(
                "connection refused".to_string(),
            )))
        }
    }
}

#[async_trait]
impl CountCache for MemoryCountCache {
    async fn increment(&self, key: &str) -> Result<(), BoardError> {
        tokio::task::yield_now().await;
        self.ensure_available()?;
        *self.counters.entry(key.to_string()).or_insert(0) += 1;

        Ok(())
    }

    async fn get_integer(&self, key: &str) -> Result<Option<i64>, BoardError> {
        tokio::task::yield_now().await;
        self.ensure_available()?;

        Ok(self.peek(key))
    }

    async fn set_integer(&self, key: &str, value: i64) -> Result<(), BoardError> {
        tokio::task::yield_now().await;
        self.ensure_available()?;
        self.counters.insert(key.to_string(), value);

        Ok(())
    }
}

pub struct Fixture {
    pub posts: Arc<MemoryPostLookup>,
    pub likes: Arc<MemoryLikeStore>,
    pub cache: Arc<MemoryCountCache>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            posts: Arc::new(MemoryPostLookup::default()),
            likes: Arc::new(MemoryLikeStore::default()),
            cache: Arc::new(MemoryCountCache::default()),
        }
    }
}
