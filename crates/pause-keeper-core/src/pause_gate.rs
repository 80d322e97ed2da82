//! Broadcast pause flag shared by every request of one interceptor.
//!
//! The flag lives in a `tokio::sync::watch` channel. Every change bumps the
//! channel version and wakes all receivers. A waiter records the version it
//! checked, so a pause/resume pair that lands between the check and the
//! suspension still completes its wait.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Cancelled;

/// Shared "hold all traffic" switch.
///
/// Cloning is cheap and every clone refers to the same flag.
///
/// # Examples
///
/// ```
/// use pause_keeper_core::PauseGate;
///
/// let gate = PauseGate::new();
/// assert!(!gate.is_paused());
///
/// {
///     let _pause = gate.begin_pause();
///     assert!(gate.is_paused());
/// }
///
/// assert!(!gate.is_paused());
/// ```
#[derive(Debug, Clone)]
pub struct PauseGate {
    state: Arc<watch::Sender<bool>>,
}

impl PauseGate {
    /// Create an unpaused gate.
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Check whether traffic is currently paused.
    pub fn is_paused(&self) -> bool {
        *self.state.borrow()
    }

    /// Set the pause flag.
    ///
    /// Setting `false` wakes every suspended waiter. Setting the value the
    /// flag already holds does nothing: no version change and no wakeups.
    pub fn set_paused(&self, paused: bool) {
        let changed = self.state.send_if_modified(|current| {
            if *current == paused {
                false
            } else {
                *current = paused;
                true
            }
        });

        if changed {
            debug!(paused, waiters = self.state.receiver_count(), "Pause gate changed");
        }
    }

    /// Pause the gate until the returned guard is dropped.
    ///
    /// The guard resets the flag on every exit path, including early returns,
    /// errors and the owning future being dropped mid-await.
    pub fn begin_pause(&self) -> PauseGuard<'_> {
        self.set_paused(true);
        PauseGuard { gate: self }
    }

    /// Wait until the gate is not paused.
    ///
    /// Returns immediately when the gate is open. Otherwise suspends until the
    /// next `set_paused(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fires while suspended. A token that is
    /// already cancelled does not fail a call that would not suspend.
    pub async fn wait_while_paused(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        // Marks the current version as seen: any later change, even one that
        // happens before the first poll below, completes `changed()`.
        let mut receiver = self.state.subscribe();
        if !*receiver.borrow_and_update() {
            return Ok(());
        }

        loop {
            tokio::select! {
                changed = receiver.changed() => {
                    // The sender is owned by `self`; a closed channel means the
                    // gate is gone and there is nothing left to wait for.
                    if changed.is_err() {
                        return Ok(());
                    }
                }
                _ = cancel.cancelled() => return Err(Cancelled),
            }

            if !*receiver.borrow_and_update() {
                return Ok(());
            }
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope guard returned by [`PauseGate::begin_pause`].
#[derive(Debug)]
#[must_use = "the gate is unpaused as soon as the guard is dropped"]
pub struct PauseGuard<'a> {
    gate: &'a PauseGate,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.gate.set_paused(false);
    }
}

#[cfg(test)]
#[path = "pause_gate_tests.rs"]
mod tests;
