use deadpool_redis::Pool;
use scylla::client::caching_session::CachingSession;
use scylla::client::session_builder::SessionBuilder;

use crate::config::{RedisConfig, ScyllaConfig};

/// Long-lived client of an external service, built once at startup.
pub trait Resource<'a> {
    type Cfg;

    #[allow(opaque_hidden_inferred_bound)]
    async fn init_resource(config: Self::Cfg) -> Self;
}

impl<'a> Resource<'a> for CachingSession {
    type Cfg = &'a ScyllaConfig;

    async fn init_resource(config: Self::Cfg) -> Self {
        let db_session = SessionBuilder::new()
            .known_nodes(&config.hosts)
            .connection_timeout(config.connection_timeout())
            .use_keyspace(&config.keyspace, false)
            .build()
            .await
            .unwrap_or_else(|e| panic!("Unable to connect to scylla hosts: {:?}. \nError: {}", config.hosts, e));

        CachingSession::from(db_session, config.statement_cache_size)
    }
}

impl<'a> Resource<'a> for Pool {
    type Cfg = &'a RedisConfig;

    async fn init_resource(config: Self::Cfg) -> Self {
        deadpool_redis::Config::from_url(config.url.as_str())
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .unwrap_or_else(|e| panic!("Unable to create redis pool for {}. \nError: {}", config.url, e))
    }
}
