//! Inquiry engine HTTP server binary

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use inquiry_engine::{
    access_token::{AccessTokenClient, PrivateKeySource},
    bank_config::BankConfigCache,
    cache::RedisTokenCache,
    config::Config,
    database::Database,
    handlers::{self, AppState},
    orchestrator::InquiryOrchestrator,
    token_service::TokenService,
    transport::HttpTransport,
};
use redis::aio::ConnectionManager;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};
use tracing::{error, info};

const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .json()
        .init();

    info!("Starting Inquiry Engine...");

    let config = Config::from_env().context("failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    info!("Configuration loaded successfully");

    let db_timeout = Duration::from_secs(config.database.connect_timeout_secs);
    let db = Arc::new(
        Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.connect_timeout_secs,
        )
        .await
        .context("failed to connect to database")?,
    );
    timeout(db_timeout, db.health_check())
        .await
        .context("database ping timed out")?
        .context("database ping failed")?;

    info!("Database connected successfully");

    let redis_timeout = Duration::from_secs(config.redis.connect_timeout_secs);
    let redis_client =
        redis::Client::open(config.redis.url.clone()).context("failed to create Redis client")?;
    let redis_conn = timeout(redis_timeout, ConnectionManager::new(redis_client))
        .await
        .context("Redis connection timed out")?
        .context("failed to connect to Redis")?;
    let token_cache = Arc::new(RedisTokenCache::new(redis_conn));
    timeout(redis_timeout, token_cache.ping())
        .await
        .context("Redis ping timed out")?
        .context("Redis ping failed")?;

    info!("Redis connected successfully");

    let bank_timeout = Duration::from_secs(config.bank.request_timeout_secs);
    let transport = Arc::new(HttpTransport::new());

    let configs = Arc::new(BankConfigCache::new(
        db.clone(),
        config.bank.default_bank_code.clone(),
    ));
    configs
        .reload()
        .await
        .context("failed to load partner bank configs")?;

    let token_client = Arc::new(AccessTokenClient::new(
        transport.clone(),
        PrivateKeySource::File(PathBuf::from(&config.bank.private_key_path)),
        bank_timeout,
    ));
    let tokens = Arc::new(TokenService::new(token_cache, db.clone(), token_client));

    let orchestrator = Arc::new(InquiryOrchestrator::new(
        configs.clone(),
        tokens.clone(),
        transport,
        db.clone(),
        bank_timeout,
    ));

    info!("Inquiry service initialized successfully");

    if config.bank.reload_interval_secs > 0 {
        tokio::spawn(run_reload_scheduler(
            configs.clone(),
            config.bank.reload_interval_secs,
        ));
    }

    let state = web::Data::new(AppState {
        orchestrator,
        configs,
        tokens,
    });
    let server_config = config.server.clone();

    info!(
        "Starting HTTP server on {}:{}",
        server_config.host, server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(handlers::configure_routes)
    })
    .workers(server_config.workers)
    .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
    .bind((server_config.host, server_config.port))?
    .run()
    .await?;

    info!("Inquiry Engine stopped");
    Ok(())
}

async fn run_reload_scheduler(configs: Arc<BankConfigCache>, every_secs: u64) {
    let mut ticker = interval(Duration::from_secs(every_secs));
    // First tick fires immediately; startup already loaded
    ticker.tick().await;

    info!("Bank config reload scheduler started (every {}s)", every_secs);

    loop {
        ticker.tick().await;

        if let Err(e) = configs.reload().await {
            error!("Scheduled bank config reload failed: {}", e);
        }
    }
}
