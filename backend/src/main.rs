//! Backend entry-point: loads settings, wires adapters and serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use clinic_newsletter::domain::ports::ConfiguredLoginService;
use clinic_newsletter::inbound::http::health::HealthState;
use clinic_newsletter::inbound::http::session_config::{
    BuildMode, SessionSettings, session_settings_from_env,
};
use clinic_newsletter::outbound::cache::RedisResponseCache;
use clinic_newsletter::outbound::persistence::{DbPool, PoolConfig, migrate};

use server::{AppSettings, ServerConfig, ServiceSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("load application settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("session configuration")?;

    let config = build_server_config(&settings, session).await?;
    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting server");
    let server = create_server(health_state, config)?;
    server.await?;
    Ok(())
}

async fn build_server_config(
    settings: &AppSettings,
    session: SessionSettings,
) -> color_eyre::Result<ServerConfig> {
    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
    )
    .with_http_config(settings.http_config()?)
    .with_service_settings(ServiceSettings {
        idempotency: settings.idempotency(),
        hash_policy: settings.hash_policy(),
        tracking_base_url: settings.tracking_base_url()?,
    });

    let mut login = ConfiguredLoginService::new();
    match settings.fixture_login()? {
        Some(account) => {
            info!(username = %account.username, "fixture login configured");
            login = login.with_account(
                account.username,
                account.password.as_str(),
                account.user_id,
            );
        }
        None => warn!("no login accounts configured; every sign-in will be rejected"),
    }
    config = config.with_login(Arc::new(login));

    if let Some(database_url) = &settings.database_url {
        let applied = migrate(database_url.clone())
            .await
            .wrap_err("run database migrations")?;
        info!(applied, "database migrations complete");
        let pool = DbPool::new(PoolConfig::new(database_url.as_str()))
            .await
            .wrap_err("create database pool")?;
        config = config.with_db_pool(pool);
    }

    if let Some(redis_url) = &settings.redis_url {
        let cache = RedisResponseCache::connect(redis_url)
            .await
            .wrap_err("connect response cache")?;
        config = config.with_response_cache(Arc::new(cache));
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(server::build_metrics()?));
    }

    Ok(config)
}
