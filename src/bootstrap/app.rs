//! Application assembly: the administrative interface the surrounding
//! CLI/config layer consumes.
//!
//! [`start`] builds one swarm repository, one pair of announce/scrape
//! handlers and one statistics keeper, and plugs every enabled transport
//! into them, so a peer announcing over UDP is visible to a peer scraping
//! over HTTP or exchanging offers over a WebSocket.
use std::net::SocketAddr;
use std::sync::Arc;

use shoal_tracker_configuration::Configuration;
use shoal_tracker_core::announce_handler::AnnounceHandler;
use shoal_tracker_core::scrape_handler::ScrapeHandler;
use shoal_tracker_core::statistics;
use shoal_tracker_core::swarm::repository::in_memory::InMemorySwarmRepository;
use shoal_tracker_primitives::swarm_metrics::SwarmsMetrics;

use super::jobs::swarm_cleanup;
use crate::servers::http::handlers::HttpServices;
use crate::servers::http::server::RunningHttpServer;
use crate::servers::udp::connection_cookie;
use crate::servers::udp::handlers::UdpServices;
use crate::servers::udp::server::RunningUdpServer;
use crate::servers::ws::handlers::WsServices;
use crate::servers::ws::registry::SessionRegistry;
use crate::servers::ws::server::RunningWsServer;
use crate::servers::{http, udp, ws};

/// Why the tracker could not start. Bind failures are fatal: the caller is
/// expected to report them and exit rather than run with a missing
/// transport.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not bind the udp tracker to {addr}: {source}")]
    UdpBind { addr: SocketAddr, source: std::io::Error },

    #[error("could not bind the http tracker to {addr}: {source}")]
    HttpBind { addr: SocketAddr, source: std::io::Error },

    #[error("could not bind the ws tracker to {addr}: {source}")]
    WsBind { addr: SocketAddr, source: std::io::Error },
}

/// The running application. Servers keep running until [`Running::shutdown`]
/// is called; dropping the struct leaks them deliberately.
pub struct Running {
    udp: Option<RunningUdpServer>,
    http: Option<RunningHttpServer>,
    ws: Option<RunningWsServer>,
    cleanup_job: swarm_cleanup::RunningCleanupJob,
    swarm_repository: Arc<InMemorySwarmRepository>,
    stats_repository: statistics::repository::Repository,
}

/// A point-in-time view of the tracker for operators: cumulative request
/// counters plus the current size of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StatsSnapshot {
    pub announce_count: u64,
    pub scrape_count: u64,
    pub swarm_count: u64,
    pub peer_count: u64,
    /// The per-transport breakdown behind the totals.
    pub metrics: statistics::repository::Metrics,
    /// The aggregate swarm gauges behind `swarm_count`/`peer_count`.
    pub swarms: SwarmsMetrics,
}

impl Running {
    #[must_use]
    pub fn udp_local_addr(&self) -> Option<SocketAddr> {
        self.udp.as_ref().map(|server| server.local_addr)
    }

    #[must_use]
    pub fn http_local_addr(&self) -> Option<SocketAddr> {
        self.http.as_ref().map(|server| server.local_addr)
    }

    #[must_use]
    pub fn ws_local_addr(&self) -> Option<SocketAddr> {
        self.ws.as_ref().map(|server| server.local_addr)
    }

    /// Safe to call concurrently with everything else; it reads, never
    /// blocks writers for long.
    pub async fn stats_snapshot(&self) -> StatsSnapshot {
        let metrics = *self.stats_repository.get_stats().await;
        let swarms = self.swarm_repository.get_metrics();

        StatsSnapshot {
            announce_count: metrics.announces_total(),
            scrape_count: metrics.scrapes_total(),
            swarm_count: swarms.swarms,
            peer_count: swarms.peers(),
            metrics,
            swarms,
        }
    }

    /// Stops the cleanup job and every listener. In-flight requests finish;
    /// new connections are refused.
    pub async fn shutdown(self) {
        if let Some(server) = self.udp {
            server.halt().await;
        }
        if let Some(server) = self.http {
            server.halt().await;
        }
        if let Some(server) = self.ws {
            server.halt().await;
        }

        self.cleanup_job.halt().await;

        tracing::info!("tracker stopped");
    }
}

/// Starts every enabled transport plus the cleanup job.
///
/// # Errors
///
/// Will return an error if any enabled transport cannot bind its address.
/// Startup is all-or-nothing from the caller's point of view: on error the
/// caller should exit, which also tears down any transport that did bind.
pub async fn start(config: &Configuration) -> Result<Running, Error> {
    let swarm_repository = Arc::new(InMemorySwarmRepository::default());

    let announce_handler = Arc::new(AnnounceHandler::new(&config.core, &swarm_repository));
    let scrape_handler = Arc::new(ScrapeHandler::new(&config.core, &swarm_repository));

    let (stats_event_sender, stats_repository) = statistics::setup::factory(config.core.tracker_usage_statistics);
    let stats_event_sender = Arc::new(stats_event_sender);

    let cleanup_job = swarm_cleanup::start_job(&config.core, &swarm_repository);

    let udp = if config.udp_tracker.enabled {
        let services = Arc::new(UdpServices {
            announce_handler: announce_handler.clone(),
            scrape_handler: scrape_handler.clone(),
            stats_event_sender: stats_event_sender.clone(),
            cookie_secret: connection_cookie::make_secret(),
        });

        Some(
            udp::server::start(config.udp_tracker.bind_address, services)
                .await
                .map_err(|source| Error::UdpBind {
                    addr: config.udp_tracker.bind_address,
                    source,
                })?,
        )
    } else {
        None
    };

    let http = if config.http_tracker.enabled {
        let services = Arc::new(HttpServices {
            announce_handler: announce_handler.clone(),
            scrape_handler: scrape_handler.clone(),
            stats_event_sender: stats_event_sender.clone(),
        });

        Some(
            http::server::start(config.http_tracker.bind_address, services)
                .await
                .map_err(|source| Error::HttpBind {
                    addr: config.http_tracker.bind_address,
                    source,
                })?,
        )
    } else {
        None
    };

    let ws = if config.ws_tracker.enabled {
        let services = Arc::new(WsServices {
            announce_handler,
            scrape_handler,
            stats_event_sender,
            registry: Arc::new(SessionRegistry::default()),
            config: config.ws_tracker,
            max_peer_list_length: config.core.max_peer_list_length,
        });

        Some(
            ws::server::start(config.ws_tracker.bind_address, services)
                .await
                .map_err(|source| Error::WsBind {
                    addr: config.ws_tracker.bind_address,
                    source,
                })?,
        )
    } else {
        None
    };

    Ok(Running {
        udp,
        http,
        ws,
        cleanup_job,
        swarm_repository,
        stats_repository,
    })
}
