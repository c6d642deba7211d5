use std::sync::Arc;
use std::time::Duration;

use services::{EngineSettings, MemoryOutbox, QuizEngine, VerbPicker, replies};
use storage::InMemorySessionStore;
use verbs_core::VerbDictionary;
use verbs_core::model::{SessionId, VerbEntry};
use verbs_core::time::fixed_clock;

const THREE_VERBS: &[(&str, &str, &str)] = &[
    ("go", "went", "gone"),
    ("wake", "woke/waked", "woken"),
    ("eat", "ate", "eaten"),
];

fn engine_with(dictionary: VerbDictionary) -> (QuizEngine, MemoryOutbox) {
    let outbox = MemoryOutbox::new();
    let engine = QuizEngine::new(
        Arc::new(dictionary),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(outbox.clone()),
    )
    .with_clock(fixed_clock())
    .with_picker(VerbPicker::seeded(1));
    (engine, outbox)
}

fn three_verbs() -> (QuizEngine, MemoryOutbox) {
    engine_with(VerbDictionary::from_triples(THREE_VERBS).unwrap())
}

async fn current_question(engine: &QuizEngine, session: SessionId) -> Option<VerbEntry> {
    engine
        .session(session)
        .await
        .unwrap()
        .and_then(|state| state.question().cloned())
}

async fn big_quiz_active(engine: &QuizEngine, session: SessionId) -> bool {
    engine
        .session(session)
        .await
        .unwrap()
        .is_some_and(|state| state.is_big_quiz_active())
}

fn count(texts: &[String], needle: &str) -> usize {
    texts.iter().filter(|text| text.as_str() == needle).count()
}

#[tokio::test(start_paused = true)]
async fn start_announces_then_asks_first_question() {
    let (engine, outbox) = three_verbs();
    let session = SessionId::new(1);

    engine.start_big_quiz(session).await.unwrap();

    let texts = outbox.texts_for(session);
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], "Starting a 2-minute quiz. Answer as many as you can!");
    let first = current_question(&engine, session).await.unwrap();
    assert_eq!(texts[1], replies::question(&first));

    let state = engine.session(session).await.unwrap().unwrap();
    assert_eq!(state.big_quiz().unwrap().remaining().len(), 2);
    assert!(engine.timers().armed_run(session).is_some());
}

#[tokio::test(start_paused = true)]
async fn accepts_either_past_tense_variant() {
    for answer in ["waked woken", "woke woken"] {
        let dictionary = VerbDictionary::from_triples(&[("wake", "woke/waked", "woken")]).unwrap();
        let (engine, outbox) = engine_with(dictionary);
        let session = SessionId::new(1);

        engine.start_big_quiz(session).await.unwrap();
        engine.handle_text(session, answer).await.unwrap();

        let texts = outbox.texts_for(session);
        assert_eq!(
            &texts[2..],
            [replies::CORRECT, replies::ALL_VERBS_ANSWERED],
            "{answer}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn answering_every_verb_ends_quiz_once() {
    let (engine, outbox) = three_verbs();
    let session = SessionId::new(1);

    engine.start_big_quiz(session).await.unwrap();
    let mut asked = Vec::new();
    let mut right = true;
    while let Some(verb) = current_question(&engine, session).await {
        asked.push(verb.base_form().to_owned());
        let answer = if right {
            format!("{} {}", verb.past_tense_forms().next().unwrap(), verb.past_participle())
        } else {
            "nope nope".to_owned()
        };
        right = !right;
        engine.handle_text(session, &answer).await.unwrap();
    }

    asked.sort();
    assert_eq!(asked, vec!["eat", "go", "wake"]);
    assert!(!big_quiz_active(&engine, session).await);
    assert_eq!(engine.timers().armed_run(session), None);

    tokio::time::sleep(Duration::from_secs(300)).await;
    tokio::task::yield_now().await;

    let texts = outbox.texts_for(session);
    assert_eq!(count(&texts, replies::ALL_VERBS_ANSWERED), 1);
    assert_eq!(count(&texts, replies::TIME_IS_UP), 0);
    assert_eq!(count(&texts, replies::CORRECT), 2);
    assert_eq!(texts.last().map(String::as_str), Some(replies::ALL_VERBS_ANSWERED));
}

#[tokio::test(start_paused = true)]
async fn timeout_ends_running_quiz_exactly_once() {
    let (engine, outbox) = three_verbs();
    let session = SessionId::new(1);

    engine.start_big_quiz(session).await.unwrap();

    tokio::time::sleep(Duration::from_secs(119)).await;
    assert!(big_quiz_active(&engine, session).await);

    tokio::time::sleep(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;
    assert!(!big_quiz_active(&engine, session).await);

    tokio::time::sleep(Duration::from_secs(600)).await;
    let texts = outbox.texts_for(session);
    assert_eq!(count(&texts, replies::TIME_IS_UP), 1);
    assert_eq!(texts.last().map(String::as_str), Some(replies::TIME_IS_UP));
}

#[tokio::test(start_paused = true)]
async fn question_left_by_timeout_is_graded_as_single_quiz() {
    let dictionary = VerbDictionary::from_triples(&[("wake", "woke/waked", "woken")]).unwrap();
    let (engine, outbox) = engine_with(dictionary);
    let session = SessionId::new(1);

    engine.start_big_quiz(session).await.unwrap();
    tokio::time::sleep(Duration::from_secs(121)).await;
    tokio::task::yield_now().await;
    assert!(!big_quiz_active(&engine, session).await);

    let pending = current_question(&engine, session).await.unwrap();
    assert_eq!(pending.base_form(), "wake");

    // the big quiz accepted either variant; a single quiz wants the stored string
    engine.handle_text(session, "woke woken").await.unwrap();
    assert_eq!(
        outbox.texts_for(session).last().map(String::as_str),
        Some(replies::incorrect("woke/waked", "woken").as_str())
    );
    assert_eq!(current_question(&engine, session).await, None);
}

#[tokio::test(start_paused = true)]
async fn question_left_by_stop_is_graded_as_single_quiz() {
    let (engine, outbox) = three_verbs();
    let session = SessionId::new(1);

    engine.start_big_quiz(session).await.unwrap();
    let pending = current_question(&engine, session).await.unwrap();
    engine.stop_big_quiz(session).await.unwrap();
    assert_eq!(current_question(&engine, session).await.as_ref(), Some(&pending));

    let answer = format!("{} {}", pending.past_tense(), pending.past_participle());
    engine.handle_text(session, &answer).await.unwrap();

    let texts = outbox.texts_for(session);
    assert_eq!(&texts[texts.len() - 2..], [replies::QUIZ_STOPPED, replies::CORRECT]);
    assert_eq!(current_question(&engine, session).await, None);
}

#[tokio::test(start_paused = true)]
async fn stop_silences_timeout_and_is_quiet_when_idle() {
    let (engine, outbox) = three_verbs();
    let session = SessionId::new(1);

    engine.stop_big_quiz(session).await.unwrap();
    assert!(outbox.texts_for(session).is_empty());

    engine.start_big_quiz(session).await.unwrap();
    engine.stop_big_quiz(session).await.unwrap();
    engine.stop_big_quiz(session).await.unwrap();
    assert_eq!(engine.timers().armed_run(session), None);

    tokio::time::sleep(Duration::from_secs(300)).await;
    tokio::task::yield_now().await;

    let texts = outbox.texts_for(session);
    assert_eq!(count(&texts, replies::QUIZ_STOPPED), 1);
    assert_eq!(count(&texts, replies::TIME_IS_UP), 0);
    assert!(!big_quiz_active(&engine, session).await);
}

#[tokio::test(start_paused = true)]
async fn restarting_replaces_the_old_deadline() {
    let (engine, outbox) = three_verbs();
    let session = SessionId::new(1);

    engine.start_big_quiz(session).await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    engine.start_big_quiz(session).await.unwrap();

    // first run's deadline passes without effect
    tokio::time::sleep(Duration::from_secs(70)).await;
    tokio::task::yield_now().await;
    assert!(big_quiz_active(&engine, session).await);
    assert_eq!(count(&outbox.texts_for(session), replies::TIME_IS_UP), 0);

    tokio::time::sleep(Duration::from_secs(60)).await;
    tokio::task::yield_now().await;
    assert!(!big_quiz_active(&engine, session).await);
    assert_eq!(count(&outbox.texts_for(session), replies::TIME_IS_UP), 1);
}

#[tokio::test(start_paused = true)]
async fn malformed_big_quiz_answer_changes_nothing() {
    let (engine, outbox) = three_verbs();
    let session = SessionId::new(1);

    engine.start_big_quiz(session).await.unwrap();
    let before = engine.session(session).await.unwrap().unwrap();

    engine.handle_text(session, "went").await.unwrap();

    let after = engine.session(session).await.unwrap().unwrap();
    assert_eq!(after.question(), before.question());
    assert_eq!(after.big_quiz(), before.big_quiz());
    assert_eq!(
        outbox.texts_for(session).last().map(String::as_str),
        Some(replies::NEED_BOTH_FORMS)
    );
}

#[tokio::test(start_paused = true)]
async fn custom_duration_drives_deadline_and_wording() {
    let outbox = MemoryOutbox::new();
    let engine = QuizEngine::new(
        Arc::new(VerbDictionary::from_triples(THREE_VERBS).unwrap()),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(outbox.clone()),
    )
    .with_settings(EngineSettings::default().with_quiz_duration(Duration::from_secs(30)));
    let session = SessionId::new(4);

    engine.start_big_quiz(session).await.unwrap();
    assert_eq!(
        outbox.texts_for(session)[0],
        "Starting a 30-second quiz. Answer as many as you can!"
    );

    tokio::time::sleep(Duration::from_secs(31)).await;
    tokio::task::yield_now().await;
    assert_eq!(
        outbox.texts_for(session).last().map(String::as_str),
        Some(replies::TIME_IS_UP)
    );
}
