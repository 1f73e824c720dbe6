use actix_web::{HttpResponse, ResponseError};
use charybdis::errors::CharybdisError;
use serde_json::json;
use std::error::Error;
use std::fmt;
use uuid::Uuid;

#[derive(Debug)]
pub enum RedisError {
    PoolError(deadpool_redis::PoolError),
    RedisError(deadpool_redis::redis::RedisError),
    Unavailable(String),
}

impl fmt::Display for RedisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedisError::PoolError(e) => write!(f, "Pool Error: {}", e),
            RedisError::RedisError(e) => write!(f, "Redis Error: {}", e),
            RedisError::Unavailable(e) => write!(f, "Unavailable: {}", e),
        }
    }
}

impl Error for RedisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RedisError::PoolError(e) => Some(e),
            RedisError::RedisError(e) => Some(e),
            RedisError::Unavailable(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum BoardError {
    // 400s
    PostNotFound(Uuid),
    // 400 | 500
    CharybdisError(CharybdisError),
    // 500
    ScyllaError(String),
    CacheUnavailable(RedisError),
    DurableWriteFailure { post_id: Uuid, source: Box<BoardError> },
    Timeout(String),
    DispatchError(String),
    InternalServerError(String),
}

impl BoardError {
    /// Transient failures that may succeed if the same operation is attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            BoardError::Timeout(_) | BoardError::ScyllaError(_) | BoardError::CacheUnavailable(_) => true,
            BoardError::CharybdisError(e) => !matches!(e, CharybdisError::NotFoundError(_)),
            BoardError::DurableWriteFailure { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::PostNotFound(id) => write!(f, "Post Not Found: {}", id),
            BoardError::CharybdisError(e) => write!(f, "Charybdis Error: \n{}", e),
            BoardError::ScyllaError(e) => write!(f, "Scylla Error: \n{}", e),
            BoardError::CacheUnavailable(e) => write!(f, "Cache Unavailable: \n{}", e),
            BoardError::DurableWriteFailure { post_id, source } => {
                write!(f, "Durable Write Failure for post {}: \n{}", post_id, source)
            }
            BoardError::Timeout(e) => write!(f, "Timeout: {}", e),
            BoardError::DispatchError(e) => write!(f, "Dispatch Error: {}", e),
            BoardError::InternalServerError(e) => write!(f, "InternalServerError: \n{}", e),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BoardError::CharybdisError(e) => Some(e),
            BoardError::CacheUnavailable(e) => Some(e),
            BoardError::DurableWriteFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl ResponseError for BoardError {
    fn error_response(&self) -> HttpResponse {
        match self {
            BoardError::PostNotFound(id) => HttpResponse::NotFound().json(json!({
                "status": 404,
                "message": format!("post {} not found", id)
            })),
            BoardError::CharybdisError(CharybdisError::NotFoundError(e)) => HttpResponse::NotFound().json(json!({
                "status": 404,
                "message": e.to_string()
            })),
            BoardError::Timeout(e) => HttpResponse::GatewayTimeout().json(json!({
                "status": 504,
                "message": e
            })),
            _ => {
                log::error!("Internal Server Error: {}", self);

                HttpResponse::InternalServerError().json(json!({
                    "status": 500,
                    "message": self.to_string()
                }))
            }
        }
    }
}

impl From<CharybdisError> for BoardError {
    fn from(e: CharybdisError) -> Self {
        BoardError::CharybdisError(e)
    }
}

impl From<deadpool_redis::PoolError> for BoardError {
    fn from(e: deadpool_redis::PoolError) -> Self {
        BoardError::CacheUnavailable(RedisError::PoolError(e))
    }
}

impl From<deadpool_redis::redis::RedisError> for BoardError {
    fn from(e: deadpool_redis::redis::RedisError) -> Self {
        BoardError::CacheUnavailable(RedisError::RedisError(e))
    }
}

impl From<tokio::time::error::Elapsed> for BoardError {
    fn from(e: tokio::time::error::Elapsed) -> Self {
        BoardError::Timeout(e.to_string())
    }
}
