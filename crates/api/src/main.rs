use std::sync::Arc;

use sqlx::SqlitePool;
use stencil_api::config::ServerConfig;
use stencil_api::router::build_app_router;
use stencil_api::state::AppState;
use stencil_mailer::{MailConfig, MailTransport, SmtpMailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let addr = config.bind_addr().expect("HOST must be an IP address");

    let pool = prepare_database(&config.database_url).await;
    let mailer = build_mailer();

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        mailer,
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Template manager listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Let in-flight writes finish before the process exits.
    pool.close().await;
    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stencil_api=debug,stencil_db=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Open the database, migrate it and make sure someone can log in.
async fn prepare_database(url: &str) -> SqlitePool {
    let pool = stencil_db::create_pool(url)
        .await
        .expect("Failed to open database");
    stencil_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    stencil_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    stencil_api::bootstrap::ensure_admin(&pool)
        .await
        .expect("Failed to provision initial admin account");
    pool
}

fn build_mailer() -> Arc<dyn MailTransport> {
    let mail_config = MailConfig::from_env();
    if mail_config.is_configured() {
        tracing::info!(smtp_host = %mail_config.smtp_host, "Mail transport configured");
    } else {
        tracing::warn!("EMAIL_USER/EMAIL_PASS not set; sending is disabled");
    }
    Arc::new(SmtpMailer::new(mail_config))
}

/// Resolve on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
