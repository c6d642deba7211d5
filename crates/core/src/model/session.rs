use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::model::answer::{AnswerError, AnswerPolicy, Guess, Verdict};
use crate::model::ids::QuizRunId;
use crate::model::verb::VerbEntry;

//
// ─── BIG QUIZ ──────────────────────────────────────────────────────────────────
//

/// A timed quiz over a shuffled permutation of the dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigQuiz {
    run_id: QuizRunId,
    remaining: VecDeque<VerbEntry>,
    started_at: DateTime<Utc>,
}

impl BigQuiz {
    #[must_use]
    pub fn run_id(&self) -> QuizRunId {
        self.run_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Verbs not yet asked, front first.
    #[must_use]
    pub fn remaining(&self) -> &VecDeque<VerbEntry> {
        &self.remaining
    }
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Where a free-text message should go, decided once from the session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A big quiz is running and waiting for an answer.
    BigQuizAnswer,
    /// A single `/quiz` question is waiting for an answer.
    QuizAnswer,
    /// Nothing is waiting for an answer.
    Ignore,
}

/// Result of advancing a big quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskNext {
    /// The next verb was popped and is now the pending question.
    Question(VerbEntry),
    /// The queue ran dry; the big quiz has ended.
    Exhausted,
    /// No big quiz is running.
    Inactive,
}

/// Result of offering a message to one of the answer handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The handler's preconditions did not hold; nothing changed.
    NotApplicable,
    /// The text was not a two-word answer; the question stays open.
    Malformed(AnswerError),
    /// The answer was graded. `next` is set when a big quiz advanced.
    Graded { verdict: Verdict, next: Option<AskNext> },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Per-user quiz state.
///
/// Holds at most one pending question and at most one running big quiz. All
/// transitions are synchronous; timers and replies live in the services layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    question: Option<VerbEntry>,
    big_quiz: Option<BigQuiz>,
    last_seen_at: DateTime<Utc>,
}

impl SessionState {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            question: None,
            big_quiz: None,
            last_seen_at: now,
        }
    }

    /// The verb currently awaiting an answer, if any.
    #[must_use]
    pub fn question(&self) -> Option<&VerbEntry> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn big_quiz(&self) -> Option<&BigQuiz> {
        self.big_quiz.as_ref()
    }

    #[must_use]
    pub fn is_big_quiz_active(&self) -> bool {
        self.big_quiz.is_some()
    }

    #[must_use]
    pub fn last_seen_at(&self) -> DateTime<Utc> {
        self.last_seen_at
    }

    /// Records user activity.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen_at = self.last_seen_at.max(now);
    }

    #[must_use]
    pub fn route(&self) -> Route {
        match (&self.question, &self.big_quiz) {
            (Some(_), Some(_)) => Route::BigQuizAnswer,
            (Some(_), None) => Route::QuizAnswer,
            (None, _) => Route::Ignore,
        }
    }

    /// Sets the pending question, replacing any previous one.
    pub fn start_quiz(&mut self, verb: VerbEntry) {
        self.question = Some(verb);
    }

    /// Starts a big quiz over `verbs` in the given order.
    ///
    /// Returns the run id of a big quiz that was replaced, so its timer can be
    /// cancelled. The first question is not asked here; call [`Self::ask_next`].
    pub fn start_big_quiz(
        &mut self,
        run_id: QuizRunId,
        verbs: impl IntoIterator<Item = VerbEntry>,
        now: DateTime<Utc>,
    ) -> Option<QuizRunId> {
        let replaced = self.big_quiz.take().map(|quiz| quiz.run_id);
        self.big_quiz = Some(BigQuiz {
            run_id,
            remaining: verbs.into_iter().collect(),
            started_at: now,
        });
        replaced
    }

    /// Ends a running big quiz and hands it back, or `None` if none was running.
    ///
    /// A question the quiz left pending stays open and is graded as a single
    /// `/quiz` answer from then on.
    pub fn stop_big_quiz(&mut self) -> Option<BigQuiz> {
        self.big_quiz.take()
    }

    /// Ends the big quiz only if `run_id` is still the running one.
    pub fn expire_big_quiz(&mut self, run_id: QuizRunId) -> Option<BigQuiz> {
        match &self.big_quiz {
            Some(quiz) if quiz.run_id == run_id => self.stop_big_quiz(),
            _ => None,
        }
    }

    /// Pops the next big-quiz verb into the pending question.
    pub fn ask_next(&mut self) -> AskNext {
        let Some(quiz) = self.big_quiz.as_mut() else {
            return AskNext::Inactive;
        };

        match quiz.remaining.pop_front() {
            Some(verb) => {
                self.question = Some(verb.clone());
                AskNext::Question(verb)
            }
            None => {
                self.big_quiz = None;
                self.question = None;
                AskNext::Exhausted
            }
        }
    }

    /// Grades an answer to a single `/quiz` question.
    ///
    /// Applies only when a question is pending and no big quiz is running. The
    /// past tense must match the stored string exactly. A graded answer closes
    /// the question; a malformed one leaves it open.
    pub fn answer_quiz(&mut self, text: &str) -> Evaluation {
        if self.big_quiz.is_some() {
            return Evaluation::NotApplicable;
        }
        let Some(verb) = self.question.as_ref() else {
            return Evaluation::NotApplicable;
        };

        let guess = match Guess::parse(text) {
            Ok(guess) => guess,
            Err(err) => return Evaluation::Malformed(err),
        };
        let verdict = verb.check(&guess, AnswerPolicy::Exact);
        self.question = None;

        Evaluation::Graded {
            verdict,
            next: None,
        }
    }

    /// Grades an answer during a big quiz and advances to the next verb.
    ///
    /// Any `/`-separated past-tense variant is accepted. The graded question is
    /// cleared before advancing.
    pub fn answer_big_quiz(&mut self, text: &str) -> Evaluation {
        if self.big_quiz.is_none() {
            return Evaluation::NotApplicable;
        }
        let Some(verb) = self.question.as_ref() else {
            return Evaluation::NotApplicable;
        };

        let guess = match Guess::parse(text) {
            Ok(guess) => guess,
            Err(err) => return Evaluation::Malformed(err),
        };
        let verdict = verb.check(&guess, AnswerPolicy::AnyPastTenseForm);
        self.question = None;
        let next = self.ask_next();

        Evaluation::Graded {
            verdict,
            next: Some(next),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
