use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("expected past tense and past participle, got {tokens} word(s)")]
    Malformed { tokens: usize },
}

/// How strictly the past tense of a guess is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPolicy {
    /// The guess must equal the stored past tense verbatim, slashes included.
    Exact,
    /// The guess may match any one of the `/`-separated past-tense variants.
    AnyPastTenseForm,
}

/// A user's two-word answer: past tense then past participle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    past_tense: String,
    past_participle: String,
}

impl Guess {
    /// Parses free text into a guess. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::Malformed` unless the text holds exactly two words.
    pub fn parse(text: &str) -> Result<Self, AnswerError> {
        let lowered = text.trim().to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();
        match tokens.as_slice() {
            [past_tense, past_participle] => Ok(Self {
                past_tense: (*past_tense).to_owned(),
                past_participle: (*past_participle).to_owned(),
            }),
            other => Err(AnswerError::Malformed {
                tokens: other.len(),
            }),
        }
    }

    #[must_use]
    pub fn past_tense(&self) -> &str {
        &self.past_tense
    }

    #[must_use]
    pub fn past_participle(&self) -> &str {
        &self.past_participle
    }
}

/// Outcome of grading a well-formed guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect {
        past_tense: String,
        past_participle: String,
    },
}

impl Verdict {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }
}
