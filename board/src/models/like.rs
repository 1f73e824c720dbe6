use charybdis::macros::charybdis_model;
use charybdis::types::{Text, Timestamp, Uuid};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// No uniqueness on (post_id, liker_id): each materialized event appends its own row.
#[charybdis_model(
    table_name = likes,
    partition_keys = [post_id],
    clustering_keys = [liker_id, id],
    global_secondary_indexes = []
)]
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub post_id: Uuid,
    pub liker_id: Text,
    pub id: Uuid,
    pub created_at: Timestamp,
}

impl Like {
    pub const COUNT_BY_POST_QUERY: &'static str = "SELECT COUNT(*) FROM likes WHERE post_id = ?";

    pub fn new(post_id: Uuid, liker_id: &str) -> Self {
        let mut like = Self {
            post_id,
            liker_id: liker_id.to_string(),
            ..Default::default()
        };
        like.set_defaults();

        like
    }

    pub fn set_defaults(&mut self) {
        if self.id == Uuid::default() {
            self.id = Uuid::new_v4();
        }

        self.created_at = Utc::now();
    }
}
