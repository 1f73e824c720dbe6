use uuid::Uuid;

/// Intent to like a post. Lives only between the request path and the materializer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LikeEvent {
    /// Dedup key for redelivered events.
    pub id: Uuid,
    pub post_id: Uuid,
    pub liker_id: String,
}

impl LikeEvent {
    pub fn new(post_id: Uuid, liker_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            liker_id: liker_id.into(),
        }
    }
}
