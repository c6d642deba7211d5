#![forbid(unsafe_code)]

pub mod repository;

pub use repository::{InMemorySessionStore, SessionStore, StorageError};
