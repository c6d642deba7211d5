use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use teloxide::Bot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use services::{EngineSettings, Outbox, QuizEngine};
use storage::InMemorySessionStore;
use verbs_core::VerbDictionary;

mod config;
mod console;
mod telegram;

use config::{Cli, RunMode};

/// How often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse()
        .into_config()
        .context("invalid configuration")?;

    let dictionary = Arc::new(VerbDictionary::irregular());
    info!(
        verbs = dictionary.len(),
        quiz = ?config.engine.quiz_duration(),
        "verb dictionary loaded"
    );

    match config.mode {
        RunMode::Telegram { token } => {
            let bot = Bot::new(token);
            let outbox = Arc::new(telegram::TelegramOutbox::new(bot.clone()));
            let engine = build_engine(dictionary, outbox, &config.engine, config.session_ttl);
            telegram::run(bot, engine).await
        }
        RunMode::Console { session } => {
            let engine = build_engine(
                dictionary,
                Arc::new(console::ConsoleOutbox),
                &config.engine,
                config.session_ttl,
            );
            console::run(engine, session).await
        }
    }
}

fn build_engine(
    dictionary: Arc<VerbDictionary>,
    outbox: Arc<dyn Outbox>,
    settings: &EngineSettings,
    session_ttl: Option<chrono::Duration>,
) -> QuizEngine {
    let engine = QuizEngine::new(dictionary, Arc::new(InMemorySessionStore::new()), outbox)
        .with_settings(*settings);
    if let Some(ttl) = session_ttl {
        spawn_idle_sweeper(engine.clone(), ttl);
    }
    engine
}

fn spawn_idle_sweeper(engine: QuizEngine, ttl: chrono::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match engine.evict_idle(ttl).await {
                Ok(0) => {}
                Ok(evicted) => info!(evicted, "evicted idle sessions"),
                Err(err) => warn!(error = %err, "idle session sweep failed"),
            }
        }
    });
}
