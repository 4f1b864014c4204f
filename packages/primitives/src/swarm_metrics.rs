/// Aggregate metrics for all the swarms the tracker currently knows about.
///
/// They are derived on demand from the swarm repository and consumed by the
/// administrative stats snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, serde::Serialize)]
pub struct SwarmsMetrics {
    /// Total number of seeders across all swarms.
    pub complete: u64,
    /// Total number of completed-download events across all swarms.
    pub downloaded: u64,
    /// Total number of leechers across all swarms.
    pub incomplete: u64,
    /// Number of swarms currently tracked.
    pub swarms: u64,
}

impl SwarmsMetrics {
    /// Number of peers currently tracked, across all swarms.
    #[must_use]
    pub fn peers(&self) -> u64 {
        self.complete + self.incomplete
    }
}
