use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::Pool;
use uuid::Uuid;

use crate::constants::LIKE_COUNT_NAMESPACE;
use crate::errors::BoardError;

pub fn like_count_key(post_id: Uuid) -> String {
    format!("{}:{}", LIKE_COUNT_NAMESPACE, post_id)
}

/// Fast per-post counters shared by every instance of the board.
#[async_trait]
pub trait CountCache: Send + Sync {
    /// Atomic on the cache side. Absent keys start from zero.
    async fn increment(&self, key: &str) -> Result<(), BoardError>;
    async fn get_integer(&self, key: &str) -> Result<Option<i64>, BoardError>;
    async fn set_integer(&self, key: &str, value: i64) -> Result<(), BoardError>;
}

#[derive(Clone)]
pub struct RedisCountCache {
    pool: Pool,
}

impl RedisCountCache {
    pub fn new(pool: &Pool) -> Self {
        Self { pool: pool.clone() }
    }
}

#[async_trait]
impl CountCache for RedisCountCache {
    async fn increment(&self, key: &str) -> Result<(), BoardError> {
        let mut connection = self.pool.get().await?;

        let _: i64 = connection.incr(key, 1).await?;

        Ok(())
    }

    async fn get_integer(&self, key: &str) -> Result<Option<i64>, BoardError> {
        let mut connection = self.pool.get().await?;

        let value: Option<i64> = connection.get(key).await?;

        Ok(value)
    }

    async fn set_integer(&self, key: &str, value: i64) -> Result<(), BoardError> {
        let mut connection = self.pool.get().await?;

        let _: () = connection.set(key, value).await?;

        Ok(())
    }
}
