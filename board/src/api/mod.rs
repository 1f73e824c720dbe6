mod like_api;
pub mod types;

pub use like_api::*;
