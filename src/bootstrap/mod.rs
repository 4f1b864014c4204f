//! Assembly of the tracker application: wiring the core services to the
//! enabled transports and the background jobs.
pub mod app;
pub mod jobs;
