//! The UDP tracker socket loop.
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::handlers::{handle_packet, UdpServices};
use super::MAX_REQUEST_SIZE;

/// A running UDP tracker. Dropping it does not stop the server; call
/// [`RunningUdpServer::halt`].
pub struct RunningUdpServer {
    /// The address the socket is actually bound to (relevant when binding
    /// port 0).
    pub local_addr: SocketAddr,
    halt_sender: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RunningUdpServer {
    /// Stops the receive loop. Datagrams already being handled finish and
    /// their responses are still sent.
    pub async fn halt(self) {
        drop(self.halt_sender.send(true));
        drop(self.task.await);
    }
}

/// Binds the socket and spawns the receive loop.
///
/// # Errors
///
/// Will return an error if the socket cannot be bound to the given address.
pub async fn start(bind_address: SocketAddr, services: Arc<UdpServices>) -> std::io::Result<RunningUdpServer> {
    let socket = Arc::new(UdpSocket::bind(bind_address).await?);
    let local_addr = socket.local_addr()?;

    let (halt_sender, mut halt_receiver) = watch::channel(false);

    tracing::info!(%local_addr, "udp tracker listening");

    let task = tokio::spawn(async move {
        // One spare byte so a maximum-size datagram is distinguishable from
        // an oversized one.
        let mut buffer = [0u8; MAX_REQUEST_SIZE + 1];

        loop {
            tokio::select! {
                _ = halt_receiver.changed() => break,
                received = socket.recv_from(&mut buffer) => {
                    match received {
                        Ok((len, source)) => {
                            if len > MAX_REQUEST_SIZE {
                                tracing::debug!(%source, len, "dropping oversized udp packet");
                                continue;
                            }

                            // Copy the datagram out so the buffer can be
                            // reused while the packet is handled.
                            let payload = buffer[..len].to_vec();
                            let socket = socket.clone();
                            let services = services.clone();

                            tokio::spawn(async move {
                                if let Some(response) = handle_packet(&payload, source, &services).await {
                                    let bytes = response.to_bytes();

                                    if let Err(error) = socket.send_to(&bytes, source).await {
                                        tracing::warn!(%source, %error, "failed to send udp response");
                                    }
                                }
                            });
                        }
                        Err(error) => {
                            tracing::warn!(%error, "udp recv error");
                        }
                    }
                }
            }
        }

        tracing::info!(%local_addr, "udp tracker halted");
    });

    Ok(RunningUdpServer {
        local_addr,
        halt_sender,
        task,
    })
}
