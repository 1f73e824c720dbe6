use log::{debug, warn};

use crate::events::dispatcher::LikeDispatcher;
use crate::models::like_event::LikeEvent;

/// Unit of work that owns an outbox of like events.
///
/// Events are invisible until [`Transaction::commit`] flushes them to the dispatcher.
/// [`Transaction::rollback`], or dropping the transaction, discards them.
pub struct Transaction {
    dispatcher: LikeDispatcher,
    outbox: Vec<LikeEvent>,
}

impl Transaction {
    pub fn begin(dispatcher: &LikeDispatcher) -> Self {
        Self {
            dispatcher: dispatcher.clone(),
            outbox: Vec::new(),
        }
    }

    pub fn enqueue(&mut self, event: LikeEvent) {
        self.outbox.push(event);
    }

    pub fn pending(&self) -> &[LikeEvent] {
        &self.outbox
    }

    /// Post-commit flush. Returns how many events reached the queue; the rest are
    /// logged by the dispatcher and lost.
    pub fn commit(mut self) -> usize {
        let outbox = std::mem::take(&mut self.outbox);
        let total = outbox.len();

        let dispatched = outbox
            .into_iter()
            .map(|event| self.dispatcher.dispatch(event))
            .filter(Result::is_ok)
            .count();

        debug!("Transaction committed: {}/{} like events dispatched", dispatched, total);

        dispatched
    }

    pub fn rollback(mut self) {
        let discarded = std::mem::take(&mut self.outbox).len();

        debug!("Transaction rolled back: {} like events discarded", discarded);
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.outbox.is_empty() {
            warn!(
                "Transaction dropped without commit: {} like events discarded",
                self.outbox.len()
            );
        }
    }
}
