//! Local play on stdin/stdout.

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use services::{InboundEvent, Outbox, OutboxError, QuizEngine};
use verbs_core::model::SessionId;

/// Prints replies to stdout.
#[derive(Clone, Copy, Default)]
pub struct ConsoleOutbox;

#[async_trait]
impl Outbox for ConsoleOutbox {
    async fn send(&self, _session: SessionId, text: String) -> Result<(), OutboxError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{text}\n").as_bytes())
            .await
            .map_err(|err| OutboxError::Transport(err.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|err| OutboxError::Transport(err.to_string()))
    }
}

/// Read lines until EOF: `/command args` runs a command, anything else is an answer.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn run(engine: QuizEngine, session: SessionId) -> anyhow::Result<()> {
    info!(%session, "console session started, type /start for help");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let Some(event) = InboundEvent::from_line(session, &line) else {
            continue;
        };
        if let Err(err) = engine.handle(event).await {
            error!(%session, error = %err, "console input failed");
        }
    }

    info!(%session, "stdin closed");
    Ok(())
}
