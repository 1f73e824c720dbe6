use std::sync::Arc;

use dashmap::DashSet;
use uuid::Uuid;

/// Posts whose cached like count may have drifted from the likes table.
#[derive(Clone, Default, Debug)]
pub struct DirtyPosts {
    posts: Arc<DashSet<Uuid>>,
}

impl DirtyPosts {
    pub fn mark(&self, post_id: Uuid) {
        self.posts.insert(post_id);
    }

    #[cfg(test)]
    pub fn contains(&self, post_id: &Uuid) -> bool {
        self.posts.contains(post_id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Removes and returns at most `limit` posts.
    pub fn drain(&self, limit: usize) -> Vec<Uuid> {
        let ids: Vec<Uuid> = self.posts.iter().take(limit).map(|id| *id).collect();

        ids.into_iter().filter(|id| self.posts.remove(id).is_some()).collect()
    }
}
