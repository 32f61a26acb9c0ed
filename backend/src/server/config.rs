//! Server settings loaded via OrthoConfig and the runtime configuration built
//! from them.

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use slumber::outbound::cache::RedisFeedCache;
use slumber::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings read from `SLUMBER_*` environment variables, CLI flags or a
/// configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SLUMBER")]
pub struct ServerSettings {
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server runs on fixture adapters.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Redis URL. Without it the feed cache is disabled.
    pub redis_url: Option<String>,
    /// Base TTL for cached feed entries, before jitter.
    #[ortho_config(default = 300)]
    pub cache_ttl_seconds: u64,
}

impl ServerSettings {
    /// Configured listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("bind address {raw} did not resolve"),
            )
        })
    }

    /// Cache TTL as a duration; zero is raised to one second.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds.max(1))
    }
}

/// Runtime configuration for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) feed_cache: Option<Arc<RedisFeedCache>>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            feed_cache: None,
        }
    }

    /// Use the Diesel adapters over `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Wrap the store ports in the read-through feed cache.
    #[must_use]
    pub fn with_feed_cache(mut self, cache: RedisFeedCache) -> Self {
        self.feed_cache = Some(Arc::new(cache));
        self
    }
}
