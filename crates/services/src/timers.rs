use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use verbs_core::model::{QuizRunId, SessionId};

/// One pending big-quiz deadline per session.
///
/// Arming a session replaces (and aborts) its previous timer. A timer that
/// fires calls [`QuizTimers::release`] instead of being aborted, so it can
/// finish sending its reply.
#[derive(Clone, Default)]
pub struct QuizTimers {
    pending: Arc<Mutex<HashMap<SessionId, (QuizRunId, AbortHandle)>>>,
}

impl QuizTimers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `on_expire` after `delay` unless cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&self, session: SessionId, run_id: QuizRunId, delay: Duration, on_expire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_expire.await;
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session, (run_id, handle.abort_handle()));
        if let Some((_, previous)) = previous {
            previous.abort();
        }
    }

    /// Aborts the pending timer of `session`. Returns whether one was pending.
    pub fn cancel(&self, session: SessionId) -> bool {
        let removed = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session);
        match removed {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Forgets the timer of `session` without aborting it, if it belongs to `run_id`.
    pub fn release(&self, session: SessionId, run_id: QuizRunId) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.get(&session).is_some_and(|(armed, _)| *armed == run_id) {
            pending.remove(&session);
        }
    }

    /// Run id of the timer pending for `session`, if any.
    #[must_use]
    pub fn armed_run(&self, session: SessionId) -> Option<QuizRunId> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session)
            .map(|(run_id, _)| *run_id)
    }
}
