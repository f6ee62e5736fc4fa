//! Authoritative per-match turn timers.
//!
//! At most one timer is armed per match. Arming replaces and aborts the
//! previous one. A timer remembers the match version it was armed at, so an
//! expiry that races a move resolves as stale in the match itself.

use std::collections::HashMap;
use std::sync::Mutex;

use codebreak_engine::MatchId;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

#[derive(Debug)]
struct ArmedTimer {
    version: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

/// Deadline tracking and expiry tasks for every playing match.
#[derive(Debug, Default)]
pub struct TurnTimers {
    armed: Mutex<HashMap<MatchId, ArmedTimer>>,
}

impl TurnTimers {
    /// No timers armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `expiry` at `deadline` unless re-armed or disarmed first.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(self, expiry))]
    pub fn arm(&self, match_id: MatchId, version: u64, deadline: Instant, expiry: BoxFuture<'static, ()>) {
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            expiry.await;
        });
        let Ok(mut armed) = self.armed.lock() else {
            warn!("Timer table lock poisoned, timer dropped");
            task.abort();
            return;
        };
        if let Some(previous) = armed.insert(match_id, ArmedTimer { version, deadline, task }) {
            previous.task.abort();
        }
        debug!("Turn timer armed");
    }

    /// Cancels the match's timer, if any.
    #[instrument(skip(self))]
    pub fn disarm(&self, match_id: MatchId) {
        let Ok(mut armed) = self.armed.lock() else {
            return;
        };
        if let Some(previous) = armed.remove(&match_id) {
            previous.task.abort();
            debug!("Turn timer disarmed");
        }
    }

    /// Forgets the timer armed at `version` without aborting its task.
    ///
    /// The expiring task calls this so re-arming during its own forfeit does
    /// not cancel it.
    pub fn release(&self, match_id: MatchId, version: u64) -> bool {
        let Ok(mut armed) = self.armed.lock() else {
            return false;
        };
        match armed.get(&match_id) {
            Some(timer) if timer.version == version => {
                armed.remove(&match_id);
                true
            }
            _ => false,
        }
    }

    /// Version and deadline of the armed timer.
    pub fn deadline(&self, match_id: MatchId) -> Option<(u64, Instant)> {
        self.armed
            .lock()
            .ok()?
            .get(&match_id)
            .map(|timer| (timer.version, timer.deadline))
    }

    /// Matches with an armed timer.
    pub fn armed_count(&self) -> usize {
        self.armed.lock().map(|armed| armed.len()).unwrap_or(0)
    }
}

impl Drop for TurnTimers {
    fn drop(&mut self) {
        if let Ok(armed) = self.armed.get_mut() {
            for timer in armed.values() {
                timer.task.abort();
            }
        }
    }
}
