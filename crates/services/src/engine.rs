use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use storage::SessionStore;
use verbs_core::model::{AskNext, Evaluation, QuizRunId, Route, SessionId, SessionState, Verdict};
use verbs_core::{Clock, VerbDictionary};

use crate::error::EngineError;
use crate::events::{InboundEvent, QuizCommand};
use crate::locks::SessionLocks;
use crate::outbox::Outbox;
use crate::picker::VerbPicker;
use crate::replies;
use crate::timers::QuizTimers;

/// Default length of a `/big_quiz` run.
pub const DEFAULT_QUIZ_DURATION: Duration = Duration::from_secs(120);

/// Tunables for `QuizEngine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    quiz_duration: Duration,
}

impl EngineSettings {
    #[must_use]
    pub fn with_quiz_duration(mut self, quiz_duration: Duration) -> Self {
        self.quiz_duration = quiz_duration;
        self
    }

    #[must_use]
    pub fn quiz_duration(&self) -> Duration {
        self.quiz_duration
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            quiz_duration: DEFAULT_QUIZ_DURATION,
        }
    }
}

/// Turns commands and answers into replies, one session at a time.
///
/// Every state change holds that session's lock: load the session, apply the
/// transition, save it, then release the lock and send the replies. Big
/// quiz deadlines are tokio tasks tracked in [`QuizTimers`] and cancelled
/// whenever the quiz ends some other way.
#[derive(Clone)]
pub struct QuizEngine {
    dictionary: Arc<VerbDictionary>,
    sessions: Arc<dyn SessionStore>,
    outbox: Arc<dyn Outbox>,
    picker: Arc<VerbPicker>,
    clock: Clock,
    settings: EngineSettings,
    timers: QuizTimers,
    locks: SessionLocks,
    next_run: Arc<AtomicU64>,
}

impl QuizEngine {
    #[must_use]
    pub fn new(
        dictionary: Arc<VerbDictionary>,
        sessions: Arc<dyn SessionStore>,
        outbox: Arc<dyn Outbox>,
    ) -> Self {
        Self {
            dictionary,
            sessions,
            outbox,
            picker: Arc::new(VerbPicker::default()),
            clock: Clock::default(),
            settings: EngineSettings::default(),
            timers: QuizTimers::new(),
            locks: SessionLocks::new(),
            next_run: Arc::new(AtomicU64::new(1)),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_picker(mut self, picker: VerbPicker) -> Self {
        self.picker = Arc::new(picker);
        self
    }

    #[must_use]
    pub fn dictionary(&self) -> &VerbDictionary {
        &self.dictionary
    }

    #[must_use]
    pub fn timers(&self) -> &QuizTimers {
        &self.timers
    }

    /// Snapshot of a session, without creating it.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the store fails.
    pub async fn session(&self, session: SessionId) -> Result<Option<SessionState>, EngineError> {
        Ok(self.sessions.get(session).await?)
    }

    /// Route an inbound event to the matching operation.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn handle(&self, event: InboundEvent) -> Result<(), EngineError> {
        match event {
            InboundEvent::Command { session, command } => self.run_command(session, command).await,
            InboundEvent::Text { session, text } => self.handle_text(session, &text).await,
        }
    }

    /// Run one command for `session`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn run_command(
        &self,
        session: SessionId,
        command: QuizCommand,
    ) -> Result<(), EngineError> {
        debug!(%session, ?command, "command");
        match command {
            QuizCommand::Start => self.greet(session).await,
            QuizCommand::Verb(arg) => self.lookup_verb(session, arg.as_deref()).await,
            QuizCommand::Verbs => self.list_verbs(session).await,
            QuizCommand::Random => self.random_verb(session).await,
            QuizCommand::Quiz => self.start_quiz(session).await,
            QuizCommand::BigQuiz => self.start_big_quiz(session).await,
            QuizCommand::StopQuiz => self.stop_big_quiz(session).await,
        }
    }

    /// Reply with the command overview.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn greet(&self, session: SessionId) -> Result<(), EngineError> {
        let text = replies::greeting(self.settings.quiz_duration);
        let replies = self.update(session, |_| vec![text]).await?;
        self.deliver(session, replies).await
    }

    /// Reply with the forms of `arg`, or explain why not.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn lookup_verb(
        &self,
        session: SessionId,
        arg: Option<&str>,
    ) -> Result<(), EngineError> {
        let text = match arg.map(str::trim).filter(|arg| !arg.is_empty()) {
            None => replies::MISSING_VERB.to_owned(),
            Some(base_form) => match self.dictionary.lookup(base_form) {
                Some(verb) => replies::verb_details(verb),
                None => replies::UNKNOWN_VERB.to_owned(),
            },
        };
        let replies = self.update(session, |_| vec![text]).await?;
        self.deliver(session, replies).await
    }

    /// Reply with the whole verb table.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn list_verbs(&self, session: SessionId) -> Result<(), EngineError> {
        let text = replies::verb_table(&self.dictionary);
        let replies = self.update(session, |_| vec![text]).await?;
        self.deliver(session, replies).await
    }

    /// Reply with one random verb.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn random_verb(&self, session: SessionId) -> Result<(), EngineError> {
        let text = self.picker.pick(&self.dictionary).map(replies::random_verb);
        let replies = self.update(session, |_| text.into_iter().collect()).await?;
        self.deliver(session, replies).await
    }

    /// Ask a single random question, replacing any pending one.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn start_quiz(&self, session: SessionId) -> Result<(), EngineError> {
        let verb = self.picker.pick(&self.dictionary).cloned();
        let replies = self
            .update(session, |state| {
                let Some(verb) = verb else {
                    return Vec::new();
                };
                let text = replies::question(&verb);
                state.start_quiz(verb);
                vec![text]
            })
            .await?;
        self.deliver(session, replies).await
    }

    /// Start a timed quiz over the whole dictionary in random order.
    ///
    /// A quiz already running for this session is replaced and its timer cancelled.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn start_big_quiz(&self, session: SessionId) -> Result<(), EngineError> {
        let verbs = self.picker.shuffled(&self.dictionary);
        let run_id = QuizRunId::new(self.next_run.fetch_add(1, Ordering::Relaxed));
        let duration = self.settings.quiz_duration;
        let now = self.clock.now();

        let replies = self
            .update(session, |state| {
                let total = verbs.len();
                if let Some(replaced) = state.start_big_quiz(run_id, verbs, now) {
                    info!(%session, %replaced, "replacing running big quiz");
                    self.timers.cancel(session);
                }
                info!(%session, %run_id, total, ?duration, "big quiz started");
                self.arm_deadline(session, run_id, duration);

                let mut out = vec![replies::big_quiz_started(duration)];
                out.extend(self.advance(session, state.ask_next()));
                out
            })
            .await?;
        self.deliver(session, replies).await
    }

    /// Stop a running big quiz. Silent when none is running.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn stop_big_quiz(&self, session: SessionId) -> Result<(), EngineError> {
        let replies = self
            .update(session, |state| match state.stop_big_quiz() {
                Some(quiz) => {
                    self.timers.cancel(session);
                    let elapsed = self.clock.elapsed_since(quiz.started_at());
                    info!(
                        %session,
                        run_id = %quiz.run_id(),
                        left = quiz.remaining().len(),
                        elapsed_secs = elapsed.num_seconds(),
                        "big quiz stopped"
                    );
                    vec![replies::QUIZ_STOPPED.to_owned()]
                }
                None => Vec::new(),
            })
            .await?;
        self.deliver(session, replies).await
    }

    /// Offer free text to whichever quiz is waiting for an answer.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn handle_text(&self, session: SessionId, text: &str) -> Result<(), EngineError> {
        let replies = self
            .update(session, |state| {
                let route = state.route();
                debug!(%session, ?route, "text message");
                match route {
                    Route::BigQuizAnswer => {
                        let evaluation = state.answer_big_quiz(text);
                        self.evaluation_replies(session, evaluation)
                    }
                    Route::QuizAnswer => {
                        let evaluation = state.answer_quiz(text);
                        self.evaluation_replies(session, evaluation)
                    }
                    Route::Ignore => Vec::new(),
                }
            })
            .await?;
        self.deliver(session, replies).await
    }

    /// Deadline callback: end big quiz `run_id` if it is still running.
    ///
    /// Does nothing when the quiz already ended, was replaced, or the session
    /// was evicted.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` for storage or reply delivery failures.
    pub async fn expire_big_quiz(
        &self,
        session: SessionId,
        run_id: QuizRunId,
    ) -> Result<(), EngineError> {
        let expired = {
            let _guard = self.locks.acquire(session).await;
            self.timers.release(session, run_id);

            let Some(mut state) = self.sessions.get(session).await? else {
                return Ok(());
            };
            match state.expire_big_quiz(run_id) {
                Some(quiz) => {
                    self.sessions.put(session, state).await?;
                    info!(
                        %session,
                        %run_id,
                        left = quiz.remaining().len(),
                        "big quiz timed out"
                    );
                    true
                }
                None => false,
            }
        };

        if expired {
            self.deliver(session, vec![replies::TIME_IS_UP.to_owned()])
                .await?;
        }
        Ok(())
    }

    /// Drop sessions idle for longer than `max_idle`. Running big quizzes are kept.
    ///
    /// A session being updated concurrently is written back by its update, so
    /// eviction never loses fresh state.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the store fails.
    pub async fn evict_idle(&self, max_idle: chrono::Duration) -> Result<usize, EngineError> {
        let evicted = self
            .sessions
            .evict_idle(self.clock.idle_cutoff(max_idle))
            .await?;
        let pruned = self.locks.prune();
        debug!(evicted, pruned, "idle sweep");
        Ok(evicted)
    }

    fn arm_deadline(&self, session: SessionId, run_id: QuizRunId, duration: Duration) {
        let engine = self.clone();
        self.timers.arm(session, run_id, duration, async move {
            if let Err(err) = engine.expire_big_quiz(session, run_id).await {
                warn!(%session, %run_id, error = %err, "big quiz timeout failed");
            }
        });
    }

    fn evaluation_replies(&self, session: SessionId, evaluation: Evaluation) -> Vec<String> {
        match evaluation {
            Evaluation::NotApplicable => Vec::new(),
            Evaluation::Malformed(err) => {
                debug!(%session, error = %err, "malformed answer");
                vec![replies::NEED_BOTH_FORMS.to_owned()]
            }
            Evaluation::Graded { verdict, next } => {
                debug!(%session, correct = verdict.is_correct(), "answer graded");
                let mut out = vec![match verdict {
                    Verdict::Correct => replies::CORRECT.to_owned(),
                    Verdict::Incorrect {
                        past_tense,
                        past_participle,
                    } => replies::incorrect(&past_tense, &past_participle),
                }];
                if let Some(next) = next {
                    out.extend(self.advance(session, next));
                }
                out
            }
        }
    }

    fn advance(&self, session: SessionId, next: AskNext) -> Option<String> {
        match next {
            AskNext::Question(verb) => Some(replies::question(&verb)),
            AskNext::Exhausted => {
                self.timers.cancel(session);
                info!(%session, "big quiz finished, every verb answered");
                Some(replies::ALL_VERBS_ANSWERED.to_owned())
            }
            AskNext::Inactive => None,
        }
    }

    /// Load-or-create `session`, apply `apply`, save, and return its replies.
    async fn update<F>(&self, session: SessionId, apply: F) -> Result<Vec<String>, EngineError>
    where
        F: FnOnce(&mut SessionState) -> Vec<String>,
    {
        let _guard = self.locks.acquire(session).await;
        let now = self.clock.now();
        let mut state = self.sessions.get_or_create(session, now).await?;
        state.touch(now);
        let replies = apply(&mut state);
        self.sessions.put(session, state).await?;
        Ok(replies)
    }

    async fn deliver(&self, session: SessionId, replies: Vec<String>) -> Result<(), EngineError> {
        for text in replies {
            if let Err(err) = self.outbox.send(session, text).await {
                warn!(%session, error = %err, "failed to deliver reply");
                return Err(err.into());
            }
        }
        Ok(())
    }
}
