//! The delivery layer: one server per transport, all dispatching into the
//! same tracker core.
pub mod http;
pub mod udp;
pub mod ws;
