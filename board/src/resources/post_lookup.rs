use std::sync::Arc;

use async_trait::async_trait;
use charybdis::operations::Find;
use scylla::client::caching_session::CachingSession;
use uuid::Uuid;

use crate::errors::BoardError;
use crate::models::post::Post;

#[async_trait]
pub trait PostLookup: Send + Sync {
    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, BoardError>;
}

#[derive(Clone)]
pub struct ScyllaPostLookup {
    db_session: Arc<CachingSession>,
}

impl ScyllaPostLookup {
    pub fn new(db_session: Arc<CachingSession>) -> Self {
        Self { db_session }
    }
}

#[async_trait]
impl PostLookup for ScyllaPostLookup {
    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, BoardError> {
        let post = Post {
            id,
            ..Default::default()
        }
        .maybe_find_by_primary_key()
        .execute(&self.db_session)
        .await?;

        Ok(post)
    }
}
