//! Telegram transport: long polling in, `sendMessage` out.

use anyhow::Context;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

use services::{Outbox, OutboxError, QuizCommand, QuizEngine};
use verbs_core::model::SessionId;

/// Telegram rejects messages longer than this many characters.
pub const MESSAGE_LIMIT: usize = 4096;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "These commands are supported:")]
pub enum BotCommand {
    #[command(description = "show what I can do")]
    Start,
    #[command(description = "show this help")]
    Help,
    #[command(description = "past tense and participle of a verb, e.g. /verb go")]
    Verb(String),
    #[command(description = "list every irregular verb")]
    Verbs,
    #[command(description = "show a random verb")]
    Random,
    #[command(description = "answer one question")]
    Quiz,
    #[command(description = "answer as many as you can before time runs out")]
    BigQuiz,
    #[command(description = "stop the running big quiz")]
    StopQuiz,
}

impl From<BotCommand> for QuizCommand {
    fn from(command: BotCommand) -> Self {
        match command {
            BotCommand::Start | BotCommand::Help => QuizCommand::Start,
            BotCommand::Verb(arg) => {
                QuizCommand::Verb(arg.split_whitespace().next().map(str::to_owned))
            }
            BotCommand::Verbs => QuizCommand::Verbs,
            BotCommand::Random => QuizCommand::Random,
            BotCommand::Quiz => QuizCommand::Quiz,
            BotCommand::BigQuiz => QuizCommand::BigQuiz,
            BotCommand::StopQuiz => QuizCommand::StopQuiz,
        }
    }
}

/// Sends engine replies to the chat the session id names.
#[derive(Clone)]
pub struct TelegramOutbox {
    bot: Bot,
}

impl TelegramOutbox {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Outbox for TelegramOutbox {
    async fn send(&self, session: SessionId, text: String) -> Result<(), OutboxError> {
        for chunk in split_message(&text, MESSAGE_LIMIT) {
            self.bot
                .send_message(ChatId(session.value()), chunk)
                .await
                .map_err(|err| OutboxError::Transport(err.to_string()))?;
        }
        Ok(())
    }
}

/// Splits `text` into pieces of at most `limit` characters, preferring line breaks.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > limit {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Register commands with Telegram and poll until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the command list cannot be registered.
pub async fn run(bot: Bot, engine: QuizEngine) -> anyhow::Result<()> {
    bot.set_my_commands(BotCommand::bot_commands())
        .await
        .context("failed to register bot commands")?;
    info!("commands registered, polling for updates");

    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<BotCommand>()
                .endpoint(on_command),
        )
        .branch(dptree::filter(is_answer_text).endpoint(on_text));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("dispatcher stopped");
    Ok(())
}

fn is_answer_text(msg: Message) -> bool {
    msg.text().is_some_and(|text| !text.trim_start().starts_with('/'))
}

async fn on_command(msg: Message, command: BotCommand, engine: QuizEngine) -> ResponseResult<()> {
    let session = SessionId::new(msg.chat.id.0);
    if let Err(err) = engine.run_command(session, command.into()).await {
        error!(%session, error = %err, "command failed");
    }
    Ok(())
}

async fn on_text(msg: Message, engine: QuizEngine) -> ResponseResult<()> {
    let session = SessionId::new(msg.chat.id.0);
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if let Err(err) = engine.handle_text(session, text).await {
        error!(%session, error = %err, "answer failed");
    }
    Ok(())
}
