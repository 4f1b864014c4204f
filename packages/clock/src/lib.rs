//! Time services for the tracker crates.
//!
//! A tracker needs "now" in two flavors: the real wall clock in production,
//! and a controllable clock in tests, so that peer-expiry behavior can be
//! exercised without sleeping.
//!
//! Each consuming crate declares which clock it uses with a `CurrentClock`
//! type alias switched on `cfg(test)`:
//!
//! ```rust
//! use shoal_tracker_clock::clock;
//!
//! #[cfg(not(test))]
//! pub(crate) type CurrentClock = clock::Working;
//!
//! #[cfg(test)]
//! pub(crate) type CurrentClock = clock::Stopped;
//! ```
pub mod clock;
