use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use tk_api::{routes, telemetry, AppState};
use tk_shared::config::{AppConfig, Environment};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Environment-specific file first; dotenvy never overrides a variable
    // that is already set
    dotenvy::from_filename(Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_tracing(&config.logging)?;

    info!(environment = %config.environment, "Starting TokenKeeper API server");

    if config.auth.jwt.is_using_default_secret() {
        warn!("JWT_SECRET_KEY is not set, the legacy HS256 scheme is disabled");
    }

    let state = AppState::bootstrap(&config)
        .await
        .context("failed to initialise signing keys")?;

    let current = state.registry.get_current()?;
    info!(
        key_id = %current.key_id(),
        keys_dir = %config.keys.keys_dir.display(),
        "Signing key ready"
    );

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Binding HTTP server");

    let data = web::Data::new(state);
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(TracingLogger::default())
            .configure(routes::configure)
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}
