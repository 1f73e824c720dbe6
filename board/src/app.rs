use std::sync::Arc;
use std::{env, fs};

use deadpool_redis::Pool;
use scylla::client::caching_session::CachingSession;
use toml::Value;

use crate::config::{LikesConfig, RedisConfig, ScyllaConfig};
use crate::resources::count_cache::{CountCache, RedisCountCache};
use crate::resources::like_store::{LikeStore, ScyllaLikeStore};
use crate::resources::post_lookup::{PostLookup, ScyllaPostLookup};
use crate::resources::resource::Resource;
use crate::services::dirty_posts::DirtyPosts;
use crate::services::like_counter::LikeCounter;
use crate::services::like_pipeline::LikePipeline;
use crate::services::materializer::LikeMaterializer;
use crate::tasks::reconcile_task;

#[derive(Clone)]
pub struct App {
    pub config: Value,
    pub likes_config: LikesConfig,
    pub like_counter: LikeCounter,
    pub like_materializer: Arc<LikeMaterializer>,
    pub like_pipeline: Arc<LikePipeline>,
}

impl App {
    pub async fn new() -> Self {
        dotenv::dotenv().ok();

        let env = env::var("ENV").expect("ENV must be set");
        let config_file = format!("config.{}.toml", env);
        let contents = fs::read_to_string(config_file).expect("Unable to read file");
        let config = contents.parse::<Value>().expect("Unable to parse TOML");

        let scylla_config = ScyllaConfig::from_config(&config);
        let redis_config = RedisConfig::from_config(&config);

        let db_session: Arc<CachingSession> = Arc::new(CachingSession::init_resource(&scylla_config).await);
        let redis_pool = Pool::init_resource(&redis_config).await;

        Self::with_stores(
            config,
            Arc::new(ScyllaPostLookup::new(db_session.clone())),
            Arc::new(ScyllaLikeStore::new(db_session)),
            Arc::new(RedisCountCache::new(&redis_pool)),
        )
    }

    /// Wires the like subsystem on top of the given stores and starts its workers.
    pub fn with_stores(
        config: Value,
        posts: Arc<dyn PostLookup>,
        like_store: Arc<dyn LikeStore>,
        cache: Arc<dyn CountCache>,
    ) -> Self {
        let likes_config = LikesConfig::from_config(&config).normalized();

        let like_counter = LikeCounter::new(like_store.clone(), cache.clone(), likes_config.cache_timeout());
        let like_materializer = Arc::new(LikeMaterializer::new(
            posts,
            like_store,
            cache,
            likes_config.clone(),
            DirtyPosts::default(),
        ));
        let like_pipeline = Arc::new(LikePipeline::start(like_materializer.clone(), &likes_config));

        Self {
            config,
            likes_config,
            like_counter,
            like_materializer,
            like_pipeline,
        }
    }

    /// Installs the global logger. Must run before any worker is spawned.
    /// Later calls are no-ops.
    pub fn init_logger() {
        let _ = env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("info")).try_init();
    }

    /// Init processes that need to be run on startup
    pub async fn init(&self) {
        // repair like counts whose cache drifted from the likes table
        reconcile_task(
            self.like_counter.clone(),
            self.like_materializer.clone(),
            self.likes_config.reconcile_interval(),
        )
        .await;
    }

    pub fn port(&self) -> u16 {
        self.config["port"].as_integer().expect("Missing port") as u16
    }
}
