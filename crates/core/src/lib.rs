#![forbid(unsafe_code)]

pub mod dictionary;
pub mod model;
pub mod time;

pub use dictionary::{DictionaryError, VerbDictionary};
pub use time::Clock;
