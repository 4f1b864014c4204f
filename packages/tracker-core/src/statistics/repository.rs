use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

/// The cumulative request counters, per transport and IP version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Metrics {
    // HTTP tracker
    pub tcp4_announces_handled: u64,
    pub tcp4_scrapes_handled: u64,
    pub tcp6_announces_handled: u64,
    pub tcp6_scrapes_handled: u64,

    // UDP tracker
    pub udp4_connections_handled: u64,
    pub udp4_announces_handled: u64,
    pub udp4_scrapes_handled: u64,
    pub udp4_errors_handled: u64,
    pub udp6_connections_handled: u64,
    pub udp6_announces_handled: u64,
    pub udp6_scrapes_handled: u64,
    pub udp6_errors_handled: u64,

    // WebSocket tracker
    pub ws4_announces_handled: u64,
    pub ws4_scrapes_handled: u64,
    pub ws6_announces_handled: u64,
    pub ws6_scrapes_handled: u64,
}

impl Metrics {
    /// Announces handled across every transport.
    #[must_use]
    pub fn announces_total(&self) -> u64 {
        self.tcp4_announces_handled
            + self.tcp6_announces_handled
            + self.udp4_announces_handled
            + self.udp6_announces_handled
            + self.ws4_announces_handled
            + self.ws6_announces_handled
    }

    /// Scrapes handled across every transport.
    #[must_use]
    pub fn scrapes_total(&self) -> u64 {
        self.tcp4_scrapes_handled
            + self.tcp6_scrapes_handled
            + self.udp4_scrapes_handled
            + self.udp6_scrapes_handled
            + self.ws4_scrapes_handled
            + self.ws6_scrapes_handled
    }
}

/// A repository for the tracker metrics.
#[derive(Clone, Debug, Default)]
pub struct Repository {
    pub stats: Arc<RwLock<Metrics>>,
}

impl Repository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_stats(&self) -> RwLockReadGuard<'_, Metrics> {
        self.stats.read().await
    }

    pub(crate) async fn increase_tcp4_announces(&self) {
        self.stats.write().await.tcp4_announces_handled += 1;
    }

    pub(crate) async fn increase_tcp4_scrapes(&self) {
        self.stats.write().await.tcp4_scrapes_handled += 1;
    }

    pub(crate) async fn increase_tcp6_announces(&self) {
        self.stats.write().await.tcp6_announces_handled += 1;
    }

    pub(crate) async fn increase_tcp6_scrapes(&self) {
        self.stats.write().await.tcp6_scrapes_handled += 1;
    }

    pub(crate) async fn increase_udp4_connections(&self) {
        self.stats.write().await.udp4_connections_handled += 1;
    }

    pub(crate) async fn increase_udp4_announces(&self) {
        self.stats.write().await.udp4_announces_handled += 1;
    }

    pub(crate) async fn increase_udp4_scrapes(&self) {
        self.stats.write().await.udp4_scrapes_handled += 1;
    }

    pub(crate) async fn increase_udp4_errors(&self) {
        self.stats.write().await.udp4_errors_handled += 1;
    }

    pub(crate) async fn increase_udp6_connections(&self) {
        self.stats.write().await.udp6_connections_handled += 1;
    }

    pub(crate) async fn increase_udp6_announces(&self) {
        self.stats.write().await.udp6_announces_handled += 1;
    }

    pub(crate) async fn increase_udp6_scrapes(&self) {
        self.stats.write().await.udp6_scrapes_handled += 1;
    }

    pub(crate) async fn increase_udp6_errors(&self) {
        self.stats.write().await.udp6_errors_handled += 1;
    }

    pub(crate) async fn increase_ws4_announces(&self) {
        self.stats.write().await.ws4_announces_handled += 1;
    }

    pub(crate) async fn increase_ws4_scrapes(&self) {
        self.stats.write().await.ws4_scrapes_handled += 1;
    }

    pub(crate) async fn increase_ws6_announces(&self) {
        self.stats.write().await.ws6_announces_handled += 1;
    }

    pub(crate) async fn increase_ws6_scrapes(&self) {
        self.stats.write().await.ws6_scrapes_handled += 1;
    }
}
