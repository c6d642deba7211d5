//! User-facing reply texts.

use std::fmt::Write as _;
use std::time::Duration;

use verbs_core::model::VerbEntry;
use verbs_core::VerbDictionary;

pub const UNKNOWN_VERB: &str = "Sorry, I do not know this verb.";
pub const MISSING_VERB: &str = "Please provide a base form of a verb.";
pub const CORRECT: &str = "Correct!";
pub const NEED_BOTH_FORMS: &str = "Please provide both the past tense and past participle.";
pub const QUIZ_STOPPED: &str = "The quiz has been stopped.";
pub const ALL_VERBS_ANSWERED: &str = "You have answered all the verbs! The quiz has ended.";
pub const TIME_IS_UP: &str = "Time is up! The quiz has ended.";

/// Help text listing every command.
#[must_use]
pub fn greeting(quiz_duration: Duration) -> String {
    format!(
        "Hi! I am your Irregular Verb Learning Bot. \
         Use /verb <base_form> to get the past tense and past participle of a verb. \
         Use /verbs to get the list of all irregular verbs. \
         Use /random to get a random irregular verb. \
         Use /quiz to start a quiz on irregular verbs. \
         Use /big_quiz to start a {} quiz on irregular verbs. \
         Use /stop_quiz to stop the ongoing quiz.",
        duration_label(quiz_duration)
    )
}

#[must_use]
pub fn verb_details(verb: &VerbEntry) -> String {
    format!(
        "{}: Past Tense - {}, Past Participle - {}",
        verb.display_name(),
        verb.past_tense(),
        verb.past_participle()
    )
}

/// The whole dictionary as a pipe-separated table.
#[must_use]
pub fn verb_table(dictionary: &VerbDictionary) -> String {
    let mut table = String::from(
        "Here are the irregular verbs:\n\
         Base Form | Past Tense | Past Participle\n\
         ----------|------------|----------------\n",
    );
    for verb in dictionary.iter() {
        let _ = writeln!(
            table,
            "{} | {} | {}",
            verb.base_form(),
            verb.past_tense(),
            verb.past_participle()
        );
    }
    table
}

#[must_use]
pub fn random_verb(verb: &VerbEntry) -> String {
    format!(
        "Random Verb: {} - {} - {}",
        verb.display_name(),
        verb.past_tense(),
        verb.past_participle()
    )
}

#[must_use]
pub fn question(verb: &VerbEntry) -> String {
    format!(
        "What are the past tense and past participle of \"{}\"?",
        verb.base_form()
    )
}

#[must_use]
pub fn incorrect(past_tense: &str, past_participle: &str) -> String {
    format!(
        "Incorrect. The correct answers are: Past Tense - {past_tense}, Past Participle - {past_participle}"
    )
}

#[must_use]
pub fn big_quiz_started(quiz_duration: Duration) -> String {
    format!(
        "Starting a {} quiz. Answer as many as you can!",
        duration_label(quiz_duration)
    )
}

/// "2-minute" for whole minutes, "90-second" otherwise.
fn duration_label(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{}-minute", secs / 60)
    } else {
        format!("{secs}-second")
    }
}
