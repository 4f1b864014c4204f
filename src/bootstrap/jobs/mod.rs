//! Background jobs spawned next to the servers.
pub mod swarm_cleanup;
