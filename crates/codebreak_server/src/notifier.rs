//! Port for side effects after each committed transition.

use async_trait::async_trait;
use tracing::info;

use crate::events::MatchEvent;

/// Called once per committed transition, after it is durable and published.
///
/// Implementations must not fail the transition; it has already happened.
#[async_trait]
pub trait MatchNotifier: Send + Sync {
    /// Reacts to a committed transition.
    async fn on_transition(&self, event: &MatchEvent);
}

/// Notifier that logs each transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl MatchNotifier for TracingNotifier {
    async fn on_transition(&self, event: &MatchEvent) {
        info!(
            match_id = %event.match_id(),
            version = event.version(),
            status = %event.snapshot().status(),
            transition = event.transition().kind(),
            "Transition committed"
        );
    }
}
