mod config;
mod message;
mod relay;
mod routes;
mod state;
mod ws;

use tokio::net::TcpListener;

use config::{generate_config_template, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "parley_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "parley_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("Parley server v{} starting", env!("CARGO_PKG_VERSION"));

    // Connection registry plus the dispatch queue between ingress actors and
    // the broadcaster. Both are injected rather than process-wide state.
    let registry = relay::registry::Registry::new();
    let (dispatch_tx, dispatch_rx) = relay::new_dispatch_queue();

    // Spawn the single broadcaster task
    tokio::spawn(relay::broadcaster::run_broadcaster(
        dispatch_rx,
        registry.clone(),
    ));

    // Build application state
    let app_state = state::AppState {
        registry,
        dispatch_tx,
        assets_dir: config.assets_dir.clone(),
    };

    // Build router
    let app = routes::build_router(app_state);

    // Bind and serve. Failure to bind is the only fatal error.
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
