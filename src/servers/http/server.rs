//! The HTTP tracker server.
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::handlers::{handle_announce, handle_scrape, HttpServices};

/// A running HTTP tracker. Call [`RunningHttpServer::halt`] for a graceful
/// shutdown: the listener closes and in-flight requests complete.
pub struct RunningHttpServer {
    pub local_addr: SocketAddr,
    halt_sender: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RunningHttpServer {
    pub async fn halt(self) {
        drop(self.halt_sender.send(()));
        drop(self.task.await);
    }
}

/// Binds the listener and spawns the server.
///
/// # Errors
///
/// Will return an error if the listener cannot be bound to the given
/// address.
pub async fn start(bind_address: SocketAddr, services: Arc<HttpServices>) -> std::io::Result<RunningHttpServer> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    let local_addr = listener.local_addr()?;

    let app = Router::new()
        .route("/announce", get(handle_announce))
        .route("/scrape", get(handle_scrape))
        .with_state(services);

    let (halt_sender, halt_receiver) = oneshot::channel();

    tracing::info!(%local_addr, "http tracker listening");

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move {
                drop(halt_receiver.await);
            });

        if let Err(error) = server.await {
            tracing::error!(%error, "http tracker server error");
        }

        tracing::info!(%local_addr, "http tracker halted");
    });

    Ok(RunningHttpServer {
        local_addr,
        halt_sender,
        task,
    })
}
