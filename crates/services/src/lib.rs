#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod events;
pub mod locks;
pub mod outbox;
pub mod picker;
pub mod replies;
pub mod timers;

pub use verbs_core::Clock;

pub use engine::{EngineSettings, QuizEngine};
pub use error::{EngineError, OutboxError};
pub use events::{InboundEvent, QuizCommand};
pub use locks::SessionLocks;
pub use outbox::{MemoryOutbox, Outbox};
pub use picker::VerbPicker;
pub use timers::QuizTimers;
