//! The WebSocket tracker server.
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::handlers::{handle_ws, WsServices};

/// A running WebSocket tracker. Call [`RunningWsServer::halt`] for a
/// graceful shutdown; open peer sessions run their implicit-stop teardown
/// as their sockets close.
pub struct RunningWsServer {
    pub local_addr: SocketAddr,
    halt_sender: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RunningWsServer {
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
pub async fn start(bind_address: SocketAddr, services: Arc<WsServices>) -> std::io::Result<RunningWsServer> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    let local_addr = listener.local_addr()?;

    let app = Router::new().route("/", get(handle_ws)).with_state(services);

    let (halt_sender, halt_receiver) = oneshot::channel();

    tracing::info!(%local_addr, "ws tracker listening");

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move {
                drop(halt_receiver.await);
            });

        if let Err(error) = server.await {
            tracing::error!(%error, "ws tracker server error");
        }

        tracing::info!(%local_addr, "ws tracker halted");
    });

    Ok(RunningWsServer {
        local_addr,
        halt_sender,
        task,
    })
}
