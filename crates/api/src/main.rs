use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use roster_core::services::ServicesConfig;
use roster_events::{
    ChannelQueue, EventBus, NotificationSender, NotificationStore, PgNotificationStore,
    WelcomeEmailRelay,
};
use roster_worker::{EmailConfig, JobRunner, LogMailer, Mailer, SmtpMailer, WorkerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_api::config::ServerConfig;
use roster_api::router::build_app_router;
use roster_api::state::AppState;
use roster_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "roster_api=debug,roster_events=debug,roster_worker=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let services = ServicesConfig::from_env();
    tracing::info!(configured = ?services.configured(), "Loaded third-party service settings");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = roster_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    roster_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    roster_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Job queue + runner ---
    let (queue, receiver) = ChannelQueue::new();

    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => match SmtpMailer::new(email_config) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                tracing::warn!(error = %e, "SMTP mailer unavailable, logging emails instead");
                Arc::new(LogMailer::new())
            }
        },
        None => {
            tracing::info!("SMTP_HOST not set, logging emails instead of sending");
            Arc::new(LogMailer::new())
        }
    };

    let runner_cancel = CancellationToken::new();
    let runner = JobRunner::new(mailer, WorkerConfig::from_env());
    let mut runner_handle = tokio::spawn(runner.run(receiver, runner_cancel.clone()));

    // --- Event bus ---
    let mut bus = EventBus::new();
    WelcomeEmailRelay::new(Arc::new(queue)).register(&mut bus);
    let event_bus = Arc::new(bus);
    tracing::info!("Event bus created");

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager), heartbeat_cancel.clone());

    // --- Notifications ---
    let store: Arc<dyn NotificationStore> = Arc::new(PgNotificationStore::new(pool.clone()));
    let notifier = NotificationSender::new(Arc::clone(&store), ws_manager.clone());

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        services: Arc::new(services),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
        store,
        notifier,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_cancel.cancel();
    let _ = heartbeat_handle.await;

    // Dropping the last bus handle drops the queue producer, so the runner
    // drains what is already queued and then exits.
    drop(event_bus);
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, &mut runner_handle).await.is_err() {
        tracing::warn!("Job runner did not drain in time, cancelling");
        runner_cancel.cancel();
        let _ = runner_handle.await;
    }
    tracing::info!("Job runner stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
