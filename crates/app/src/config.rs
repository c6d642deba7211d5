use std::time::Duration;

use clap::{Parser, Subcommand};
use services::EngineSettings;
use verbs_core::model::SessionId;

/// Ten years; longer TTLs are clamped.
const MAX_SESSION_TTL_MINS: u64 = 60 * 24 * 3650;

/// Configuration errors caught after argument parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("a bot token is required: pass --token or set TELOXIDE_TOKEN")]
    MissingToken,
    #[error("--quiz-secs must be greater than zero")]
    ZeroQuizDuration,
}

/// Irregular verb trainer bot.
#[derive(Parser, Debug)]
#[command(name = "verb-bot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Option<Mode>,

    /// Telegram bot token.
    #[arg(long, env = "TELOXIDE_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Length of a /big_quiz run, in seconds.
    #[arg(long, env = "VERB_BOT_QUIZ_SECS", default_value_t = 120, global = true)]
    pub quiz_secs: u64,

    /// Drop sessions idle for this many minutes (0 keeps them forever).
    #[arg(long, env = "VERB_BOT_SESSION_TTL_MINS", default_value_t = 1440, global = true)]
    pub session_ttl_mins: u64,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Serve Telegram chats via long polling (default).
    Telegram,
    /// Play locally on stdin/stdout, no token needed.
    Console {
        /// Session id used for the console conversation.
        #[arg(long, default_value_t = SessionId::new(0), allow_hyphen_values = true)]
        session: SessionId,
    },
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: RunMode,
    pub engine: EngineSettings,
    pub session_ttl: Option<chrono::Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Telegram { token: String },
    Console { session: SessionId },
}

impl Cli {
    /// Check the parsed arguments and resolve defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a missing token in Telegram mode or a zero quiz length.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        if self.quiz_secs == 0 {
            return Err(ConfigError::ZeroQuizDuration);
        }

        let mode = match self.mode.unwrap_or(Mode::Telegram) {
            Mode::Telegram => {
                let token = self
                    .token
                    .filter(|token| !token.trim().is_empty())
                    .ok_or(ConfigError::MissingToken)?;
                RunMode::Telegram { token }
            }
            Mode::Console { session } => RunMode::Console { session },
        };

        let session_ttl = match self.session_ttl_mins.min(MAX_SESSION_TTL_MINS) {
            0 => None,
            mins => i64::try_from(mins).ok().map(chrono::Duration::minutes),
        };

        Ok(Config {
            mode,
            engine: EngineSettings::default()
                .with_quiz_duration(Duration::from_secs(self.quiz_secs)),
            session_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("verb-bot").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn telegram_is_default_and_needs_token() {
        let mut cli = parse(&["--quiz-secs", "120"]);
        cli.token = None;
        assert!(matches!(cli.into_config(), Err(ConfigError::MissingToken)));

        let cli = parse(&["--token", "123:abc"]);
        let config = cli.into_config().unwrap();
        assert_eq!(
            config.mode,
            RunMode::Telegram {
                token: "123:abc".into()
            }
        );
    }

    #[test]
    fn console_mode_takes_session_and_durations() {
        let cli = parse(&[
            "console",
            "--session=-5",
            "--quiz-secs",
            "90",
            "--session-ttl-mins",
            "0",
        ]);
        let config = cli.into_config().unwrap();
        assert_eq!(
            config.mode,
            RunMode::Console {
                session: SessionId::new(-5)
            }
        );
        assert_eq!(config.engine.quiz_duration(), Duration::from_secs(90));
        assert_eq!(config.session_ttl, None);
    }

    #[test]
    fn rejects_zero_quiz_length() {
        let cli = parse(&["console", "--quiz-secs", "0"]);
        assert!(matches!(cli.into_config(), Err(ConfigError::ZeroQuizDuration)));
    }
}
