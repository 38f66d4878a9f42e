use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::conversations::ConversationService;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Runs the follow-up sweep every `interval` in the background
///
/// The first sweep happens one interval after startup. Errors are logged and the
/// loop keeps going.
pub fn spawn_follow_up_scheduler(service: ConversationService, interval: Duration) -> JoinHandle<()> {
    // tokio rejects a zero period
    let interval = interval.max(MIN_INTERVAL);
    tracing::info!("Follow-up scheduler running every {:?}", interval);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval fires immediately; skip that tick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = service.identify_abandoned_conversations().await {
                tracing::error!("Follow-up sweep failed: {}", e);
            }
        }
    })
}
