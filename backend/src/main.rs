//! Slumber entry point: loads settings, wires adapters and serves the REST
//! API with health probes and OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use slumber::inbound::http::health::HealthState;
use slumber::outbound::cache::RedisFeedCache;
use slumber::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{ServerConfig, ServerSettings, create_server};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %err, "tracing init failed");
    }
}

async fn attach_database(config: ServerConfig, settings: &ServerSettings) -> Result<ServerConfig> {
    let Some(url) = settings.database_url.as_deref() else {
        warn!("no database configured; serving fixture data");
        return Ok(config);
    };
    let applied = run_pending_migrations(url).await?;
    info!(applied, "database schema up to date");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size)).await?;
    Ok(config.with_db_pool(pool))
}

async fn attach_cache(config: ServerConfig, settings: &ServerSettings) -> ServerConfig {
    let Some(url) = settings.redis_url.as_deref() else {
        return config;
    };
    match RedisFeedCache::connect(url, settings.cache_ttl()).await {
        Ok(cache) => {
            info!(ttl_seconds = settings.cache_ttl().as_secs(), "feed cache enabled");
            config.with_feed_cache(cache)
        }
        Err(err) => {
            warn!(error = %err, "feed cache unavailable; reading from the store");
            config
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let bind_addr = settings.bind_addr()?;
    let config = attach_database(ServerConfig::new(bind_addr), &settings).await?;
    let config = attach_cache(config, &settings).await;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "slumber listening");
    server.await?;
    health_state.mark_unhealthy();
    Ok(())
}
