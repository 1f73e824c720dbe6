use serde::Deserialize;
use std::time::Duration;
use toml::Value;

/// `[likes]` section of `config.{ENV}.toml`. Every key is optional.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LikesConfig {
    /// Artificial delay before a like event is materialized.
    pub materialize_delay_ms: u64,
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub lookup_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub cache_timeout_ms: u64,
    /// 1 means a failed lookup or write is dropped without retry.
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub allow_duplicate_likes: bool,
    pub reconcile_interval_secs: u64,
}

impl Default for LikesConfig {
    fn default() -> Self {
        Self {
            materialize_delay_ms: 0,
            worker_count: 4,
            queue_capacity: 1024,
            lookup_timeout_ms: 3000,
            write_timeout_ms: 3000,
            cache_timeout_ms: 500,
            max_attempts: 1,
            retry_backoff_ms: 200,
            allow_duplicate_likes: true,
            reconcile_interval_secs: 60,
        }
    }
}

/// `[scylla]` section.
#[derive(Deserialize, Debug, Clone)]
pub struct ScyllaConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    #[serde(default = "ScyllaConfig::default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
    /// Prepared statements kept by the caching session.
    #[serde(default = "ScyllaConfig::default_statement_cache_size")]
    pub statement_cache_size: usize,
}

impl ScyllaConfig {
    fn default_connection_timeout_secs() -> u64 {
        3
    }

    fn default_statement_cache_size() -> usize {
        1000
    }

    pub fn from_config(config: &Value) -> Self {
        section(config, "scylla").unwrap_or_else(|| panic!("Missing [scylla] config"))
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

/// `[redis]` section.
#[derive(Deserialize, Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    pub fn from_config(config: &Value) -> Self {
        section(config, "redis").unwrap_or_else(|| panic!("Missing [redis] config"))
    }
}

fn section<T: for<'de> Deserialize<'de>>(config: &Value, name: &str) -> Option<T> {
    config.get(name).map(|value| {
        value
            .clone()
            .try_into::<T>()
            .unwrap_or_else(|e| panic!("Invalid [{}] config: {}", name, e))
    })
}

impl LikesConfig {
    pub fn from_config(config: &Value) -> Self {
        section(config, "likes").unwrap_or_default()
    }

    pub fn materialize_delay(&self) -> Duration {
        Duration::from_millis(self.materialize_delay_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs.max(1))
    }

    /// Never less than one attempt and never zero workers.
    pub fn normalized(mut self) -> Self {
        self.max_attempts = self.max_attempts.max(1);
        self.worker_count = self.worker_count.max(1);
        self.queue_capacity = self.queue_capacity.max(1);

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_section_uses_defaults() {
        let config = "port = 3000".parse::<Value>().unwrap();
        let likes = LikesConfig::from_config(&config);

        assert_eq!(likes.materialize_delay_ms, 0);
        assert_eq!(likes.max_attempts, 1);
        assert!(likes.allow_duplicate_likes);
    }

    #[test]
    fn partial_section_overrides_given_keys() {
        let config = r#"
            [likes]
            materialize_delay_ms = 3000
            allow_duplicate_likes = false
        "#
        .parse::<Value>()
        .unwrap();
        let likes = LikesConfig::from_config(&config);

        assert_eq!(likes.materialize_delay(), Duration::from_secs(3));
        assert!(!likes.allow_duplicate_likes);
        assert_eq!(likes.worker_count, 4);
    }

    #[test]
    fn normalized_clamps_zero_values() {
        let likes = LikesConfig {
            max_attempts: 0,
            worker_count: 0,
            queue_capacity: 0,
            ..Default::default()
        }
        .normalized();

        assert_eq!(likes.max_attempts, 1);
        assert_eq!(likes.worker_count, 1);
        assert_eq!(likes.queue_capacity, 1);
    }

    #[test]
    fn storage_sections_fill_defaults() {
        let config = r#"
            [scylla]
            hosts = ["10.0.0.1:9042", "10.0.0.2:9042"]
            keyspace = "board"

            [redis]
            url = "redis://127.0.0.1:6379"
        "#
        .parse::<Value>()
        .unwrap();

        let scylla = ScyllaConfig::from_config(&config);
        let redis = RedisConfig::from_config(&config);

        assert_eq!(scylla.hosts.len(), 2);
        assert_eq!(scylla.connection_timeout(), Duration::from_secs(3));
        assert_eq!(scylla.statement_cache_size, 1000);
        assert_eq!(redis.url, "redis://127.0.0.1:6379");
    }

    #[test]
    #[should_panic(expected = "Missing [redis] config")]
    fn missing_redis_section_panics() {
        let config = "port = 3000".parse::<Value>().unwrap();

        RedisConfig::from_config(&config);
    }

    #[test]
    #[should_panic(expected = "Invalid [likes] config")]
    fn malformed_section_panics() {
        let config = "[likes]\nworker_count = \"many\"".parse::<Value>().unwrap();

        LikesConfig::from_config(&config);
    }
}
