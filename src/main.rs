use std::net::SocketAddr;

use dotenvy::dotenv;
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use reelvault::router::init_router;
use reelvault::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = init_app_state().await;

    // The sweeper stops once the shutdown flag flips, after the server has
    // drained its connections.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = state.limiter.clone().spawn_sweeper(shutdown_rx);

    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:4000")
        .await
        .expect("failed to bind listener");
    tracing::info!("server listening on http://0.0.0.0:4000");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server error");

    let _ = shutdown_tx.send(true);
    let _ = sweeper.await;
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install shutdown signal handler");
}
