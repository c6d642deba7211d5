use thiserror::Error;

use crate::model::answer::{AnswerPolicy, Guess, Verdict};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VerbError {
    #[error("base form cannot be empty")]
    EmptyBaseForm,

    #[error("past tense of {base_form:?} cannot be empty")]
    EmptyPastTense { base_form: String },

    #[error("past participle of {base_form:?} cannot be empty")]
    EmptyPastParticiple { base_form: String },
}

//
// ─── VERB ──────────────────────────────────────────────────────────────────────
//

/// One irregular verb: base form, past tense and past participle.
///
/// The past tense may list several accepted spellings separated by `/`
/// (for example `woke/waked`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbEntry {
    base_form: String,
    past_tense: String,
    past_participle: String,
}

impl VerbEntry {
    /// Creates a verb entry, lowercasing and trimming every form.
    ///
    /// # Errors
    ///
    /// Returns `VerbError` if any of the three forms is blank.
    pub fn new(
        base_form: impl Into<String>,
        past_tense: impl Into<String>,
        past_participle: impl Into<String>,
    ) -> Result<Self, VerbError> {
        let base_form = normalize(base_form.into());
        let past_tense = normalize(past_tense.into());
        let past_participle = normalize(past_participle.into());

        if base_form.is_empty() {
            return Err(VerbError::EmptyBaseForm);
        }
        if past_tense.is_empty() {
            return Err(VerbError::EmptyPastTense { base_form });
        }
        if past_participle.is_empty() {
            return Err(VerbError::EmptyPastParticiple { base_form });
        }

        Ok(Self {
            base_form,
            past_tense,
            past_participle,
        })
    }

    #[must_use]
    pub fn base_form(&self) -> &str {
        &self.base_form
    }

    /// The stored past tense, including every `/`-separated variant.
    #[must_use]
    pub fn past_tense(&self) -> &str {
        &self.past_tense
    }

    #[must_use]
    pub fn past_participle(&self) -> &str {
        &self.past_participle
    }

    /// Individual accepted past-tense spellings.
    pub fn past_tense_forms(&self) -> impl Iterator<Item = &str> {
        self.past_tense.split('/')
    }

    /// Base form with its first letter upper-cased, as shown in replies.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut chars = self.base_form.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Grades a guess against this verb.
    ///
    /// `AnswerPolicy::Exact` compares the past tense against the whole stored
    /// string; `AnswerPolicy::AnyPastTenseForm` accepts any single variant.
    #[must_use]
    pub fn check(&self, guess: &Guess, policy: AnswerPolicy) -> Verdict {
        let tense_ok = match policy {
            AnswerPolicy::Exact => guess.past_tense() == self.past_tense,
            AnswerPolicy::AnyPastTenseForm => self
                .past_tense_forms()
                .any(|form| form == guess.past_tense()),
        };

        if tense_ok && guess.past_participle() == self.past_participle {
            Verdict::Correct
        } else {
            Verdict::Incorrect {
                past_tense: self.past_tense.clone(),
                past_participle: self.past_participle.clone(),
            }
        }
    }
}

fn normalize(raw: String) -> String {
    raw.trim().to_lowercase()
}
