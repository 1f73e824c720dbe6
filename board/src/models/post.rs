use charybdis::macros::charybdis_model;
use charybdis::types::{Text, Timestamp, Uuid};
use serde::{Deserialize, Serialize};

// Posts are owned by the board's CRUD layer. Likes only read them by id.
#[charybdis_model(
    table_name = posts,
    partition_keys = [id],
    clustering_keys = [],
    global_secondary_indexes = []
)]
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: Text,
    pub content: Text,
    pub created_by: Text,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
