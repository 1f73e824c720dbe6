use log::error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::errors::BoardError;
use crate::models::like_event::LikeEvent;

/// Sending half of the like event queue. Only committed transactions dispatch.
#[derive(Clone, Debug)]
pub struct LikeDispatcher {
    sender: mpsc::Sender<LikeEvent>,
}

impl LikeDispatcher {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<LikeEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        (Self { sender }, receiver)
    }

    /// Never waits for queue space: a full or closed queue drops the event.
    pub fn dispatch(&self, event: LikeEvent) -> Result<(), BoardError> {
        let (event_id, post_id) = (event.id, event.post_id);

        self.sender.try_send(event).map_err(|e| {
            let reason = match e {
                TrySendError::Full(_) => "queue full",
                TrySendError::Closed(_) => "queue closed",
            };

            error!(
                "Dropping like event {} for post {}: {}",
                event_id, post_id, reason
            );

            BoardError::DispatchError(format!("like event {} not dispatched: {}", event_id, reason))
        })
    }
}
