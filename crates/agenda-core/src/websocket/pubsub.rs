//! WebSocket pub/sub (Simplified stub for initial release)

use crate::websocket::{WebSocketMessage, ConnectionId};
use crate::cache::RedisPool;
use std::sync::Arc;

/// Stub pub/sub manager
pub struct RedisPubSub {
    _pool: Arc<RedisPool>,
}

impl RedisPubSub {
    pub fn new(pool: RedisPool) -> Self {
        Self {
            _pool: Arc::new(pool),
        }
    }
    
    pub async fn publish_to_topic(&self, _topic: &str, _message: WebSocketMessage) -> crate::cache::CacheResult<usize> {
        Ok(0)
    }
    
    pub async fn run_subscriber(&self) {
        // Stub - does nothing
        tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
    }
}

/// Stub subscription
pub struct Subscription {
    pub id: uuid::Uuid,
    pub topic: String,
    pub connection_id: ConnectionId,
}
