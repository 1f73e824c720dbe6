use uuid::Uuid;

use crate::events::Transaction;
use crate::models::like_event::LikeEvent;

/// Request path of a like. Validation and writes are left to the materializer,
/// so nothing here can fail; the event fires only if `txn` commits.
pub fn request_like(txn: &mut Transaction, post_id: Uuid, liker_id: &str) -> LikeEvent {
    let event = LikeEvent::new(post_id, liker_id);
    txn.enqueue(event.clone());

    event
}
