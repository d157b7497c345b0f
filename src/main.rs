use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use bible_reader::config;
use bible_reader::store::{self, StoreProvisioner};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bible_reader=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "bible-reader v{} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME")
    );

    // Load configuration / 加载配置
    let app_config = config::init_config()
        .map_err(anyhow::Error::msg)?
        .read()
        .clone();
    tracing::info!("Server will listen on {}", app_config.get_bind_address());

    let provisioner = store::init_provisioner(StoreProvisioner::from_config(&app_config))
        .map_err(anyhow::Error::msg)?;
    tracing::info!("Corpus database: {:?}", provisioner.destination());

    let state = Arc::new(AppState::new(app_config.clone(), provisioner));

    // 预先准备数据库，失败时由后续请求重试 / Eager provisioning, failures are retried per request
    match state.library().await {
        Ok(library) => match library.books().await {
            Ok(books) => tracing::info!("Corpus ready: {} books", books.len()),
            Err(e) => tracing::warn!("Corpus opened but book count failed: {}", e),
        },
        Err(e) => tracing::error!("Corpus store not ready yet: {}", e),
    }

    let app = api::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    if let Some(store) = state.provisioner.handle() {
        store.close().await;
    }

    Ok(())
}
