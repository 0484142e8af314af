use todo_server::config::ServerConfig;
use todo_server::{telemetry, AppState, Repository};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            std::process::exit(1);
        }
    };
    telemetry::init(config.log_format);

    let store = match config.open_store() {
        Ok(store) => store,
        Err(error) => {
            tracing::error!(%error, storage = ?config.storage, "failed to open store");
            std::process::exit(1);
        }
    };
    tracing::info!(storage = ?config.storage, "store ready");

    let state = AppState::new(Repository::new(store))
        .with_error_details(config.expose_error_details);

    let addr = config.bind_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "listening");

    if let Err(error) = todo_server::run_until(listener, state, shutdown_signal()).await {
        tracing::error!(%error, "server error");
        std::process::exit(1);
    }
    tracing::info!("shut down");
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
