pub mod count_cache;
pub mod like_store;
pub mod post_lookup;
pub mod resource;
