use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use verbs_core::model::SessionId;

use crate::error::OutboxError;

/// Outbound port: delivers a reply to the user behind a session.
#[async_trait]
pub trait Outbox: Send + Sync {
    /// Send `text` to `session`.
    ///
    /// # Errors
    ///
    /// Returns `OutboxError` if the transport rejects the message.
    async fn send(&self, session: SessionId, text: String) -> Result<(), OutboxError>;
}

/// Outbox that keeps every reply in memory, in send order.
#[derive(Clone, Default)]
pub struct MemoryOutbox {
    sent: Arc<Mutex<Vec<(SessionId, String)>>>,
}

impl MemoryOutbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reply sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<(SessionId, String)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replies sent to one session.
    #[must_use]
    pub fn texts_for(&self, session: SessionId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(id, _)| *id == session)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Removes and returns every reply sent so far.
    pub fn take(&self) -> Vec<(SessionId, String)> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl Outbox for MemoryOutbox {
    async fn send(&self, session: SessionId, text: String) -> Result<(), OutboxError> {
        self.sent
            .lock()
            .map_err(|_| OutboxError::Closed)?
            .push((session, text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_replies_per_session() {
        let outbox = MemoryOutbox::new();
        outbox.send(SessionId::new(1), "a".into()).await.unwrap();
        outbox.send(SessionId::new(2), "b".into()).await.unwrap();
        outbox.send(SessionId::new(1), "c".into()).await.unwrap();

        assert_eq!(outbox.texts_for(SessionId::new(1)), vec!["a", "c"]);
        assert_eq!(outbox.take().len(), 3);
        assert!(outbox.sent().is_empty());
    }
}
