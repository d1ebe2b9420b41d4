use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use buildhook::backend::HttpBackend;
use buildhook::config::Config;
use buildhook::registry::Directory;
use buildhook::server::{AppState, build_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "buildhook=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("invalid configuration");

    let directory = Directory::from_json_file(&config.directory_path)
        .expect("failed to load directory snapshot");
    tracing::info!(
        projects = directory.projects.len(),
        tokens = directory.tokens.len(),
        path = %config.directory_path.display(),
        "directory snapshot loaded"
    );

    let backend = HttpBackend::new(config.backend_url.clone());
    let app = build_router(AppState::new(directory, backend));

    tracing::info!(addr = %config.addr, backend = %config.backend_url, "listening");

    let listener = tokio::net::TcpListener::bind(config.addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
