// Referral Gateway Service - HTTP entry point for the referral ledger
// Serves the referral API and runs the scheduled ledger backups

use referral_gateway::{
    config::Config,
    rate_limit::CallerRateLimiter,
    router,
    scheduler::{BackupJob, BackupScheduler},
    AppState,
};
use referral_ledger::{JsonFileStorage, ReferralLedger, SharedSecret};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false) {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_line_number(true)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("🚀 Starting Referral Gateway Service");

    // Load configuration
    let config = Config::from_env()?;

    // Open ledger
    let storage = Arc::new(JsonFileStorage::new(&config.ledger.data_file));
    let data_file = storage.path().display().to_string();
    let faucet_token = Arc::new(SharedSecret::new(config.auth.faucet_token.clone()));
    let ledger = Arc::new(ReferralLedger::open(
        config.ledger.clone(),
        storage,
        faucet_token,
    )?);
    info!(%data_file, "Ledger opened");

    let limiter = CallerRateLimiter::per_minute(config.rate_limit.use_referral_per_minute);

    // Background jobs
    let mut scheduler = BackupScheduler::new().await?;
    let backup = config
        .backup
        .enabled
        .then(|| BackupJob::new(ledger.clone(), config.ledger.backup_dir.clone()));
    scheduler
        .start(&config.backup.schedule, backup, limiter.clone())
        .await?;

    let state = AppState {
        ledger,
        settle_secret: Arc::new(SharedSecret::new(config.auth.secret_key.clone())),
        limiter,
    };
    let app = router(state);

    // Start server
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("✅ Gateway listening on: {}", bind_addr);
    info!("   POST /api/register-referral - Register a referrer");
    info!("   POST /api/use-referral - Attach a referee");
    info!("   GET  /api/referral-status/:address - Referrer status");
    info!("   GET  /api/payout-list - Unpaid payout list");
    info!("   POST /api/mark-paid - Settle all referrals");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.stop().await?;
    info!("Referral gateway stopped");
    Ok(())
}
