mod answer;
mod ids;
mod session;
mod verb;

pub use answer::{AnswerError, AnswerPolicy, Guess, Verdict};
pub use ids::{QuizRunId, SessionId};
pub use session::{AskNext, BigQuiz, Evaluation, Route, SessionState};
pub use verb::{VerbEntry, VerbError};
