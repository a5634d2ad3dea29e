use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use cardbox_core::Store;
use crate::api::routes::{
    create_cards, create_deck, get_card, get_deck, health, list_cards, list_decks, update_cards,
    update_deck, AppState,
};

pub fn router(store: Arc<dyn Store>, timeout: Duration) -> Router {
    let state = Arc::new(AppState { store });

    let api = Router::new()
        .route("/decks/", get(list_decks).post(create_deck))
        .route("/decks/:deck_id/", get(get_deck).put(update_deck))
        .route(
            "/decks/:deck_id/cards/",
            get(list_cards).post(create_cards).put(update_cards),
        )
        .route("/cards/:card_id/", get(get_card));

    // A timed-out request drops its unit of work, which rolls it back.
    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(store: Arc<dyn Store>, addr: SocketAddr, timeout: Duration) -> anyhow::Result<()> {
    let app = router(store, timeout);

    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{}", addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("received Ctrl+C, shutting down"),
        _ = terminate => warn!("received SIGTERM, shutting down"),
    }
}
