use events_portal::{
    App, AppContext,
    api::{DataClientState, HttpDataClient},
    config::{AppConfig, Env},
    session::{FileSessionStore, SessionState},
    shell,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point of the terminal client: configuration, logging, the Data Client,
/// the session store and finally the interactive shell.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise keep the terminal quiet apart from our own events.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "events_portal=info".into());

    // 3. Initialize Logging based on Environment
    // Logs go to stderr so they never interleave with the screens on stdout.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Data Client (REST data store)
    let client = HttpDataClient::new(&config.api_base_url, config.request_timeout)
        .expect("FATAL: Invalid API_BASE_URL.");
    let client = Arc::new(client) as DataClientState;
    tracing::info!("Data store at {}", config.api_base_url);

    // 5. Session Store (file-backed)
    let session = Arc::new(FileSessionStore::new(&config.session_dir)) as SessionState;

    // 6. Context Assembly & Shell
    let ctx = AppContext::new(client, session, config);
    shell::run(App::new(ctx)).await;
}
