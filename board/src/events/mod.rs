pub mod dispatcher;
pub mod transaction;

pub use dispatcher::LikeDispatcher;
pub use transaction::Transaction;
