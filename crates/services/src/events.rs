use verbs_core::model::SessionId;

/// A command the engine understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizCommand {
    Start,
    /// `/verb <base_form>`; `None` when no argument was given.
    Verb(Option<String>),
    Verbs,
    Random,
    Quiz,
    BigQuiz,
    StopQuiz,
}

impl QuizCommand {
    /// Parses a command name and its arguments.
    ///
    /// A leading `/` and a trailing `@botname` are ignored. `help` is an alias
    /// of `start`. Unknown names return `None`.
    #[must_use]
    pub fn from_parts(name: &str, args: &[String]) -> Option<Self> {
        let name = name.trim().trim_start_matches('/');
        let name = name.split_once('@').map_or(name, |(name, _bot)| name);

        let command = match name.to_lowercase().as_str() {
            "start" | "help" => Self::Start,
            "verb" => Self::Verb(
                args.iter()
                    .map(|arg| arg.trim())
                    .find(|arg| !arg.is_empty())
                    .map(str::to_owned),
            ),
            "verbs" => Self::Verbs,
            "random" => Self::Random,
            "quiz" => Self::Quiz,
            "big_quiz" => Self::BigQuiz,
            "stop_quiz" => Self::StopQuiz,
            _ => return None,
        };
        Some(command)
    }
}

/// Something that arrived from the messaging transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Command {
        session: SessionId,
        command: QuizCommand,
    },
    Text {
        session: SessionId,
        text: String,
    },
}

impl InboundEvent {
    /// Classifies a raw chat line: `/name args..` is a command, anything else is text.
    ///
    /// Returns `None` for blank lines and unknown commands.
    #[must_use]
    pub fn from_line(session: SessionId, line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if line.starts_with('/') {
            let mut words = line.split_whitespace();
            let name = words.next()?;
            let args: Vec<String> = words.map(str::to_owned).collect();
            let command = QuizCommand::from_parts(name, &args)?;
            return Some(Self::Command { session, command });
        }

        Some(Self::Text {
            session,
            text: line.to_owned(),
        })
    }

    #[must_use]
    pub fn session(&self) -> SessionId {
        match self {
            Self::Command { session, .. } | Self::Text { session, .. } => *session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn parses_every_command_name() {
        let cases = [
            ("start", QuizCommand::Start),
            ("/help", QuizCommand::Start),
            ("verbs", QuizCommand::Verbs),
            ("random", QuizCommand::Random),
            ("quiz", QuizCommand::Quiz),
            ("big_quiz", QuizCommand::BigQuiz),
            ("/stop_quiz@VerbBot", QuizCommand::StopQuiz),
        ];
        for (name, expected) in cases {
            assert_eq!(QuizCommand::from_parts(name, &[]), Some(expected), "{name}");
        }
        assert_eq!(QuizCommand::from_parts("dance", &[]), None);
    }

    #[test]
    fn verb_takes_first_non_blank_argument() {
        assert_eq!(
            QuizCommand::from_parts("verb", &args(&["", "Go", "away"])),
            Some(QuizCommand::Verb(Some("Go".into())))
        );
        assert_eq!(
            QuizCommand::from_parts("verb", &[]),
            Some(QuizCommand::Verb(None))
        );
    }

    #[test]
    fn classifies_lines() {
        let id = SessionId::new(9);
        assert_eq!(
            InboundEvent::from_line(id, "/verb go"),
            Some(InboundEvent::Command {
                session: id,
                command: QuizCommand::Verb(Some("go".into()))
            })
        );
        assert_eq!(
            InboundEvent::from_line(id, "  went gone "),
            Some(InboundEvent::Text {
                session: id,
                text: "went gone".into()
            })
        );
        assert_eq!(InboundEvent::from_line(id, "/unknown"), None);
        assert_eq!(InboundEvent::from_line(id, "   "), None);
        assert_eq!(
            InboundEvent::from_line(id, "hello").map(|e| e.session()),
            Some(id)
        );
    }
}
