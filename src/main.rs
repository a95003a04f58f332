use std::sync::Arc;

use onboarding_profile::config::ServerConfig;
use onboarding_profile::onboarding::{OnboardingRouteState, onboarding_routes};
use onboarding_profile::store::{LibSqlBackend, ProfileStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env();
    config.validate()?;

    eprintln!("Onboarding profile step v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Profile API: http://0.0.0.0:{}/api/onboarding/profile", config.port);

    // ── Database ─────────────────────────────────────────────────────────
    let store: Arc<dyn ProfileStore> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!(
        "   Photo limit: {} bytes, bio limit: {} chars\n",
        config.step.max_photo_bytes, config.step.bio_max_chars
    );

    // ── HTTP ─────────────────────────────────────────────────────────────
    let app = onboarding_routes(OnboardingRouteState {
        store,
        config: config.step.clone(),
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Onboarding server started");
    axum::serve(listener, app).await?;

    Ok(())
}
