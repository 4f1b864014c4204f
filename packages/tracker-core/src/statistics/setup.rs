use tokio::sync::mpsc;

use super::event::{handle_event, EventSender, Sender};
use super::repository::Repository;

/// Builds the statistics keeper: the repository holding the counters and,
/// when statistics are enabled, the event sender the delivery layers use to
/// report handled requests.
///
/// When enabled, a listener task is spawned to drain the event channel into
/// the repository; it ends when the last sender is dropped.
#[must_use]
pub fn factory(tracker_usage_statistics: bool) -> (Option<Box<dyn EventSender>>, Repository) {
    let stats_repository = Repository::new();

    if !tracker_usage_statistics {
        return (None, stats_repository);
    }

    let (sender, mut receiver) = mpsc::unbounded_channel();

    let repository_for_listener = stats_repository.clone();

    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            handle_event(event, &repository_for_listener).await;
        }
    });

    (Some(Box::new(Sender::new(sender))), stats_repository)
}
