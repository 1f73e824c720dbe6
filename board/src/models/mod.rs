pub mod like;
pub mod like_event;
pub mod post;
