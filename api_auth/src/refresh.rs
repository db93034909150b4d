//! Single-flight coordination of token refreshes.
//!
//! The gate is a two state machine, `Idle` and `Refreshing`. The first caller
//! to find it idle leads the cycle and runs the refresh; everyone arriving
//! while it is refreshing queues behind it and receives the leader's outcome.
//! At most one refresh is in flight per gate.
//!
//! A caller whose credential was already replaced by the time it reaches an
//! idle gate does not start a cycle; the check runs under the gate's lock, so
//! a cycle finishing concurrently cannot slip in between.

use std::{
    collections::VecDeque,
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::debug;
use tokio::sync::oneshot;

/// Result of one refresh cycle, shared with every waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The new bearer token.
    Refreshed(String),
    /// Why the refresh failed; the session is gone.
    Failed(String),
}

impl RefreshOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed(_))
    }
}

#[derive(Debug)]
enum GateState {
    Idle,
    Refreshing {
        waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
    },
}

enum Entry<'a> {
    Leader(RefreshLease<'a>),
    Waiter(oneshot::Receiver<RefreshOutcome>),
    Superseded(String),
}

#[derive(Debug)]
pub struct RefreshGate {
    state: Mutex<GateState>,
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshGate {
    pub fn new() -> Self {
        RefreshGate {
            state: Mutex::new(GateState::Idle),
        }
    }

    /// Joins the current refresh cycle, or starts one by running `refresh`.
    ///
    /// `superseded` returns the current token when it differs from the one
    /// the caller was rejected with; it is consulted under the gate's lock
    /// whenever the gate is idle, and a `Some` resolves the call without a
    /// cycle. Only the leader runs `refresh`; waiters resolve with the
    /// leader's outcome. If the leader is cancelled before it resolves, the
    /// waiters contend again and one of them leads a fresh cycle.
    pub async fn acquire_or_wait<S, F, Fut>(&self, superseded: S, refresh: F) -> RefreshOutcome
    where
        S: Fn() -> Option<String>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshOutcome>,
    {
        let mut refresh = Some(refresh);
        loop {
            match self.enter(&superseded) {
                Entry::Superseded(token) => return RefreshOutcome::Refreshed(token),
                Entry::Leader(lease) => {
                    let Some(refresh) = refresh.take() else {
                        return RefreshOutcome::Failed("refresh already consumed".to_string());
                    };
                    let outcome = refresh().await;
                    lease.resolve(outcome.clone());
                    return outcome;
                }
                Entry::Waiter(receiver) => match receiver.await {
                    Ok(outcome) => return outcome,
                    Err(_) => debug!("Refresh leader went away, contending again"),
                },
            }
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), GateState::Refreshing { .. })
    }

    fn enter(&self, superseded: &dyn Fn() -> Option<String>) -> Entry<'_> {
        let mut state = self.lock();
        if let GateState::Refreshing { waiters } = &mut *state {
            let (sender, receiver) = oneshot::channel();
            waiters.push_back(sender);
            debug!("Refresh in flight, {} request(s) waiting", waiters.len());
            return Entry::Waiter(receiver);
        }
        if let Some(token) = superseded() {
            debug!("Token already replaced, skipping refresh");
            return Entry::Superseded(token);
        }
        *state = GateState::Refreshing {
            waiters: VecDeque::new(),
        };
        Entry::Leader(RefreshLease {
            gate: self,
            resolved: false,
        })
    }

    // Back to idle, handing over whoever queued during the cycle.
    fn release(&self) -> VecDeque<oneshot::Sender<RefreshOutcome>> {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, GateState::Idle) {
            GateState::Refreshing { waiters } => waiters,
            GateState::Idle => VecDeque::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held by the one caller that runs the refresh.
struct RefreshLease<'a> {
    gate: &'a RefreshGate,
    resolved: bool,
}

impl RefreshLease<'_> {
    fn resolve(mut self, outcome: RefreshOutcome) {
        self.resolved = true;
        for waiter in self.gate.release() {
            // A waiter whose caller is gone has nobody left to tell.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            // Dropping the senders wakes every waiter with a closed channel.
            drop(self.gate.release());
        }
    }
}
