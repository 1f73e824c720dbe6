pub mod dirty_posts;
pub mod like_counter;
pub mod like_pipeline;
pub mod like_service;
pub mod materializer;
