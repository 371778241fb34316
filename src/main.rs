use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use vehicle_rental::config::EnvironmentConfig;
use vehicle_rental::database::DatabaseConnection;
use vehicle_rental::repositories::{PgBookingRepository, PgVehicleRepository};
use vehicle_rental::routes::create_app_router;
use vehicle_rental::services::{LocalProofStorage, SystemClock};
use vehicle_rental::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚗 Vehicle Rental - Booking Engine");
    info!("==================================");
    info!("🌍 Environment: {}", config.environment);
    if config.is_development() {
        warn!("⚠️ Development mode: set JWT_SECRET before exposing this server");
    }

    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Database connection failed: {:#}", e);
            return Err(e);
        }
    };
    let pool = db_connection.pool().clone();

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("📁 Payment proofs stored in {}", config.upload_dir.display());

    let proofs = Arc::new(LocalProofStorage::new(
        config.upload_dir.clone(),
        config.max_upload_bytes,
    ));
    let addr: SocketAddr = config.server_url().parse()?;

    let state = AppState::new(
        config,
        Arc::new(PgBookingRepository::new(pool.clone())),
        Arc::new(PgVehicleRepository::new(pool)),
        proofs,
        Arc::new(SystemClock),
    );
    let app = create_app_router(state);

    info!("🌐 Server listening on http://{}", addr);
    info!("🔍 Endpoints:");
    info!("   GET  /health");
    info!("   GET  /api/vehicles, /api/vehicles/:id, /api/vehicles/:id/availability");
    info!("   POST /api/bookings/quote, /api/bookings, /api/bookings/:id/cancel");
    info!("   GET  /api/bookings, /api/bookings/:id");
    info!("🛡️ Admin:");
    info!("   GET  /api/admin/bookings/pending, /api/admin/bookings");
    info!("   POST /api/admin/bookings/:id/decision");
    info!("   POST/PUT/DELETE /api/admin/vehicles, PUT /api/admin/vehicles/:id/status");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    info!("👋 Server stopped");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 Termination signal received, shutting down...");
        },
    }
}
