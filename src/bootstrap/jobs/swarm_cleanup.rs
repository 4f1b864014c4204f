//! The periodic job that expires inactive peers and evicts empty swarms.
use std::sync::Arc;
use std::time::Duration;

use shoal_tracker_configuration::Core;
use shoal_tracker_core::swarm::manager::SwarmsManager;
use shoal_tracker_core::swarm::repository::in_memory::InMemorySwarmRepository;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct RunningCleanupJob {
    halt_sender: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RunningCleanupJob {
    pub async fn halt(self) {
        drop(self.halt_sender.send(true));
        drop(self.task.await);
    }
}

/// Spawns the cleanup timer. It runs independently of request traffic; the
/// per-swarm locking in the repository keeps each tick incremental instead
/// of stopping the world.
#[must_use]
pub fn start_job(config: &Core, in_memory_swarm_repository: &Arc<InMemorySwarmRepository>) -> RunningCleanupJob {
    let swarms_manager = SwarmsManager::new(config, in_memory_swarm_repository);
    let period = Duration::from_secs(config.tracker_policy.inactive_peer_cleanup_interval.max(1));

    let (halt_sender, mut halt_receiver) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);

        // The first tick fires immediately; skip it so a freshly started
        // tracker does not sweep an empty registry.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = halt_receiver.changed() => break,
                _ = interval.tick() => {
                    tracing::debug!("cleaning up inactive peers");
                    swarms_manager.cleanup_swarms();
                }
            }
        }
    });

    RunningCleanupJob { halt_sender, task }
}
