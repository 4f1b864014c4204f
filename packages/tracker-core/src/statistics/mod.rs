//! Tracker usage statistics.
//!
//! The tracker keeps counters for the requests it handles, per transport and
//! IP version:
//!
//! - `*_announces_handled`: number of `announce` requests handled.
//! - `*_scrapes_handled`: number of `scrape` requests handled.
//! - `udp*_connections_handled`: number of UDP `connect` requests handled
//!   (HTTP and WebSocket have no equivalent request).
//!
//! The delivery layers do not touch the counters directly. When a server
//! handles a request it sends a [`event::Event`] through the
//! [`event::EventSender`] it was given; a listener task owned by this module
//! folds the events into the [`repository::Repository`]. That keeps the hot
//! request path free of lock contention on the metrics.
//!
//! Statistics can be disabled altogether with the
//! `core.tracker_usage_statistics` setting, in which case no event sender is
//! handed out and the counters stay at zero.
pub mod event;
pub mod repository;
pub mod setup;
