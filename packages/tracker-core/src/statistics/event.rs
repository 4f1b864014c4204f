use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendError;

use super::repository::Repository;

/// An event sent by a delivery layer each time it handles a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    // HTTP tracker
    Tcp4Announce,
    Tcp4Scrape,
    Tcp6Announce,
    Tcp6Scrape,

    // UDP tracker
    Udp4Connect,
    Udp4Announce,
    Udp4Scrape,
    Udp4Error,
    Udp6Connect,
    Udp6Announce,
    Udp6Scrape,
    Udp6Error,

    // WebSocket tracker
    Ws4Announce,
    Ws4Scrape,
    Ws6Announce,
    Ws6Scrape,
}

/// The send half handed to the delivery layers.
pub trait EventSender: Sync + Send {
    fn send_event(&self, event: Event) -> Option<Result<(), SendError<Event>>>;
}

pub struct Sender {
    sender: mpsc::UnboundedSender<Event>,
}

impl Sender {
    #[must_use]
    pub(crate) fn new(sender: mpsc::UnboundedSender<Event>) -> Self {
        Self { sender }
    }
}

impl EventSender for Sender {
    fn send_event(&self, event: Event) -> Option<Result<(), SendError<Event>>> {
        Some(self.sender.send(event))
    }
}

pub(crate) async fn handle_event(event: Event, stats_repository: &Repository) {
    match event {
        // HTTP
        Event::Tcp4Announce => {
            stats_repository.increase_tcp4_announces().await;
        }
        Event::Tcp4Scrape => {
            stats_repository.increase_tcp4_scrapes().await;
        }
        Event::Tcp6Announce => {
            stats_repository.increase_tcp6_announces().await;
        }
        Event::Tcp6Scrape => {
            stats_repository.increase_tcp6_scrapes().await;
        }

        // UDP4
        Event::Udp4Connect => {
            stats_repository.increase_udp4_connections().await;
        }
        Event::Udp4Announce => {
            stats_repository.increase_udp4_announces().await;
        }
        Event::Udp4Scrape => {
            stats_repository.increase_udp4_scrapes().await;
        }
        Event::Udp4Error => {
            stats_repository.increase_udp4_errors().await;
        }

        // UDP6
        Event::Udp6Connect => {
            stats_repository.increase_udp6_connections().await;
        }
        Event::Udp6Announce => {
            stats_repository.increase_udp6_announces().await;
        }
        Event::Udp6Scrape => {
            stats_repository.increase_udp6_scrapes().await;
        }
        Event::Udp6Error => {
            stats_repository.increase_udp6_errors().await;
        }

        // WebSocket
        Event::Ws4Announce => {
            stats_repository.increase_ws4_announces().await;
        }
        Event::Ws4Scrape => {
            stats_repository.increase_ws4_scrapes().await;
        }
        Event::Ws6Announce => {
            stats_repository.increase_ws6_announces().await;
        }
        Event::Ws6Scrape => {
            stats_repository.increase_ws6_scrapes().await;
        }
    }

    tracing::debug!("stats: {:?}", stats_repository.get_stats().await);
}
