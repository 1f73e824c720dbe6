use std::sync::Arc;

use async_trait::async_trait;
use charybdis::operations::Insert;
use scylla::client::caching_session::CachingSession;
use uuid::Uuid;

use crate::errors::BoardError;
use crate::models::like::Like;

/// Durable like records.
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Appends a like and returns its id.
    async fn insert_like(&self, post_id: Uuid, liker_id: &str) -> Result<Uuid, BoardError>;
    async fn count_likes_by_post(&self, post_id: Uuid) -> Result<i64, BoardError>;
    async fn like_exists(&self, post_id: Uuid, liker_id: &str) -> Result<bool, BoardError>;
}

#[derive(Clone)]
pub struct ScyllaLikeStore {
    db_session: Arc<CachingSession>,
}

impl ScyllaLikeStore {
    pub fn new(db_session: Arc<CachingSession>) -> Self {
        Self { db_session }
    }
}

#[async_trait]
impl LikeStore for ScyllaLikeStore {
    async fn insert_like(&self, post_id: Uuid, liker_id: &str) -> Result<Uuid, BoardError> {
        let like = Like::new(post_id, liker_id);

        like.insert().execute(&self.db_session).await?;

        Ok(like.id)
    }

    async fn count_likes_by_post(&self, post_id: Uuid) -> Result<i64, BoardError> {
        let (count,) = self
            .db_session
            .execute_unpaged(Like::COUNT_BY_POST_QUERY, (post_id,))
            .await
            .map_err(|e| BoardError::ScyllaError(format!("Failed to count likes of post {}: {}", post_id, e)))?
            .into_rows_result()
            .map_err(|e| BoardError::ScyllaError(format!("Count of post {} returned no rows: {}", post_id, e)))?
            .single_row::<(i64,)>()
            .map_err(|e| BoardError::ScyllaError(format!("Malformed count of post {}: {}", post_id, e)))?;

        Ok(count)
    }

    async fn like_exists(&self, post_id: Uuid, liker_id: &str) -> Result<bool, BoardError> {
        let existing_like = Like::maybe_find_first_by_post_id_and_liker_id(post_id, liker_id.to_string())
            .execute(&self.db_session)
            .await?;

        Ok(existing_like.is_some())
    }
}
