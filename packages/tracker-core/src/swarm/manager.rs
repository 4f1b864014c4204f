use std::sync::Arc;
use std::time::Duration;

use shoal_tracker_clock::clock::Time;
use shoal_tracker_configuration::Core;

use super::repository::in_memory::InMemorySwarmRepository;
use crate::CurrentClock;

pub struct SwarmsManager {
    /// The tracker configuration.
    config: Core,

    /// The in-memory swarms repository.
    in_memory_swarm_repository: Arc<InMemorySwarmRepository>,
}

impl SwarmsManager {
    #[must_use]
    pub fn new(config: &Core, in_memory_swarm_repository: &Arc<InMemorySwarmRepository>) -> Self {
        Self {
            config: config.clone(),
            in_memory_swarm_repository: in_memory_swarm_repository.clone(),
        }
    }

    /// Remove inactive peers and (optionally) peerless swarms.
    ///
    /// A peer is inactive when it has not announced for longer than the
    /// announce interval times the grace-period multiplier.
    pub fn cleanup_swarms(&self) {
        let current_cutoff =
            CurrentClock::now_sub(&Duration::from_secs(u64::from(self.config.max_peer_timeout()))).unwrap_or_default();

        self.in_memory_swarm_repository.remove_inactive_peers(current_cutoff);

        if self.config.tracker_policy.remove_peerless_swarms {
            self.in_memory_swarm_repository.remove_peerless_swarms();
        }
    }
}
