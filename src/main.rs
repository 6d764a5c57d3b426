use anyhow::{Context, Result};
use localized_problems::api::{self, AppState};
use localized_problems::config::Config;
use localized_problems::error::ErrorType;
use localized_problems::i18n::{Locale, LocaleRegistry, ResourceBundles};
use localized_problems::translator::ProblemTranslator;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("localized_problems=info".parse()?),
        )
        .init();

    info!("Starting localized problems service");

    // Load configuration from environment
    let config = Config::from_env()?;

    let registry = LocaleRegistry::new(&config.supported_locales)
        .context("Invalid SUPPORTED_LOCALES")?;
    info!(
        "Supported locales: {}",
        registry
            .locales()
            .iter()
            .map(|l| l.code())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let bundles = ResourceBundles::load_dir(&config.messages_dir, &config.messages_basename, &registry)
        .with_context(|| format!("Failed to load message bundles from {}", config.messages_dir))?;

    // Missing baseline keys degrade to the generic fallback text
    for error_type in ErrorType::ALL {
        for key in [error_type.message_key(), error_type.title_key()] {
            if !bundles.contains(&Locale::ENGLISH, key) {
                warn!(key = key, "Baseline bundle has no message for error classification");
            }
        }
    }

    let translator =
        ProblemTranslator::new(Arc::new(bundles)).with_type_base_uri(&config.problem_type_base_uri);
    let app = api::router(AppState::new(registry, translator));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
