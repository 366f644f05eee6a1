//! Microblog entry-point: loads settings, prepares storage and serves HTTP.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::info;

use microblog::inbound::http::health::HealthState;
use microblog::inbound::http::session_config::{
    BuildMode, fingerprint::key_fingerprint, session_settings,
};
use microblog::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use microblog::settings::AppSettings;
use server::{ServerConfig, create_server, init_logging};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let settings = AppSettings::load().wrap_err("failed to load configuration")?;
    let _log_guard = init_logging(settings.log_dir()).wrap_err("failed to initialise logging")?;
    info!(log_dir = %settings.log_dir().display(), "Microblog startup");

    let session = session_settings(&settings.session_toggles(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let db_pool = match settings.database_url() {
        Some(url) => Some(connect_database(url, settings.run_migrations()).await?),
        None => None,
    };

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
        settings.upload_dir().to_path_buf(),
    )
    .with_posts_per_page(settings.posts_per_page())
    .with_max_upload_bytes(settings.max_upload_bytes())
    .with_session_ttl_hours(settings.session_ttl_hours());
    if let Some(pool) = db_pool {
        config = config.with_db_pool(pool);
    }

    let bind_addr = config.bind_addr;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start HTTP server")?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("HTTP server stopped with an error")
}

async fn connect_database(url: &str, run_migrations: bool) -> Result<DbPool> {
    if run_migrations {
        let applied = run_pending_migrations(url)
            .await
            .wrap_err("failed to apply migrations")?;
        info!(applied, "database migrations applied");
    }
    let pool = DbPool::new(PoolConfig::new(url))
        .await
        .wrap_err("failed to connect to database")?;
    info!("database pool ready");
    Ok(pool)
}
