//! Create an admin account or reset its password.
//!
//! ```text
//! reset-admin [username] [password]
//! ```
//!
//! `username` defaults to `admin`. Without a password a random one is
//! generated and printed.

use stencil_api::auth::password::generate_password;
use stencil_api::bootstrap::{reset_admin, AdminReset, DEFAULT_ADMIN_USERNAME};
use stencil_api::config::DEFAULT_DATABASE_URL;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stencil_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let username = args
        .next()
        .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());
    let password = args.next().unwrap_or_else(generate_password);

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let pool = stencil_db::create_pool(&database_url)
        .await
        .expect("Failed to open database");
    stencil_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    match reset_admin(&pool, &username, &password).await {
        Ok(outcome) => {
            let action = match outcome {
                AdminReset::Created => "created",
                AdminReset::PasswordReset => "password reset",
            };
            println!("Admin '{username}' {action}.");
            println!("Password: {password}");
        }
        Err(e) => {
            eprintln!("Failed to reset admin '{username}': {e}");
            std::process::exit(1);
        }
    }

    pool.close().await;
}
