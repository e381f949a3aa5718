//! Single-flight gate for async boundary calls.
//!
//! Each call gets a [`RequestId`] and an [`AbortSignal`]. Starting a new
//! request aborts the one in flight, and a result that arrives for a
//! request that is no longer current is dropped.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receives the abort notice for one request.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the request is aborted. Never resolves if the request
    /// completes first.
    pub async fn aborted(&mut self) {
        if self.rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Handle for a request started with [`RequestGate::begin`].
#[derive(Debug)]
pub struct RequestTicket {
    pub id: RequestId,
    pub signal: AbortSignal,
}

#[derive(Debug, Default)]
struct GateState {
    next_id: u64,
    current: Option<(RequestId, watch::Sender<bool>)>,
}

#[derive(Debug, Default)]
pub struct RequestGate {
    state: Mutex<GateState>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request, aborting whichever one was in flight.
    pub fn begin(&self) -> RequestTicket {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((previous, tx)) = state.current.take() {
            tracing::debug!("aborting request {} in favour of a newer one", previous);
            tx.send_replace(true);
        }
        state.next_id += 1;
        let id = RequestId(state.next_id);
        let (tx, rx) = watch::channel(false);
        state.current = Some((id, tx));
        RequestTicket {
            id,
            signal: AbortSignal { rx },
        }
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(state.current, Some((current, _)) if current == id)
    }

    /// Hands back `result` if `id` is still the current request, and clears
    /// it. A stale result is logged and dropped.
    pub fn complete<T>(&self, id: RequestId, result: T) -> Option<T> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !matches!(state.current, Some((current, _)) if current == id) {
            tracing::warn!("discarding result of stale request {}", id);
            return None;
        }
        state.current = None;
        Some(result)
    }

    /// Aborts the request in flight, if any.
    pub fn abort(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((id, tx)) = state.current.take() {
            tracing::debug!("aborting request {}", id);
            tx.send_replace(true);
        }
    }

    /// Runs `fut` as a new request. Returns `None` when it was aborted or
    /// superseded before finishing.
    pub async fn run<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        let RequestTicket { id, mut signal } = self.begin();
        tokio::select! {
            output = fut => self.complete(id, output),
            _ = signal.aborted() => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;

    #[test]
    fn newer_request_aborts_older() {
        let gate = RequestGate::new();
        let first = gate.begin();
        let second = gate.begin();
        assert!(first.id < second.id);
        assert!(first.signal.is_aborted());
        assert!(!second.signal.is_aborted());
        assert!(!gate.is_current(first.id));
        assert!(gate.is_current(second.id));
    }

    #[test]
    fn stale_result_is_discarded() {
        let gate = RequestGate::new();
        let first = gate.begin();
        let second = gate.begin();
        assert_eq!(gate.complete(first.id, "old"), None);
        assert_eq!(gate.complete(second.id, "new"), Some("new"));
        // Completing clears the current request.
        assert_eq!(gate.complete(second.id, "again"), None);
    }

    #[test]
    fn abort_clears_current() {
        let gate = RequestGate::new();
        let ticket = gate.begin();
        gate.abort();
        assert!(ticket.signal.is_aborted());
        assert_eq!(gate.complete(ticket.id, 1), None);
    }

    #[tokio::test]
    async fn run_returns_output() {
        let gate = RequestGate::new();
        assert_eq!(gate.run(async { 7 }).await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn newer_run_supersedes_slow_one() {
        let gate = RequestGate::new();
        let slow = gate.run(async {
            sleep(Duration::from_secs(5)).await;
            "slow"
        });
        let fast = async {
            sleep(Duration::from_millis(10)).await;
            gate.run(async { "fast" }).await
        };
        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow, None);
        assert_eq!(fast, Some("fast"));
    }

    #[tokio::test]
    async fn signal_stays_pending_after_completion() {
        let gate = RequestGate::new();
        let RequestTicket { id, mut signal } = gate.begin();
        gate.complete(id, ());
        let waited = tokio::time::timeout(Duration::from_millis(20), signal.aborted()).await;
        assert!(waited.is_err());
    }
}
