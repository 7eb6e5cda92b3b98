//! Session and journal persistence across reopen
//!
//! Uses real sled and SQLite files in a temporary directory with a manual
//! clock so expiry can be simulated.

use coachkit::clock::SharedClock;
use coachkit::config::{Config, InterventionConfig};
use coachkit::engine::CoachEngine;
use coachkit::intent::Mood;
use coachkit::intervention::{Category, CloseOutcome, InterventionMachine, Reaction};
use coachkit::profile::{Goal, MoodEntry};
use coachkit::session::{
    MemorySessionStore, SessionManager, SessionState, SessionStore, SledSessionStore,
};
use coachkit::storage::MoodJournal;
use tempfile::TempDir;

mod common;

fn open_manager(dir: &TempDir, clock: SharedClock) -> SessionManager {
    let store = SledSessionStore::open(dir.path().join("session.db")).expect("open sled");
    SessionManager::from_config(&Config::default(), Box::new(store), clock)
}

#[test]
fn test_session_restores_profile_and_conversation() {
    let dir = TempDir::new().unwrap();
    let clock = common::manual_clock();

    let token = {
        let mut manager = open_manager(&dir, clock.clone());
        let token = manager.create(common::profile(Goal::WeightLoss));
        manager
            .conversation_mut()
            .add_user_turn("how many carbs?", clock_now(&clock));
        manager
            .conversation_mut()
            .add_system_turn("Around half your plate.", clock_now(&clock));
        manager.persist().unwrap();
        token
    };

    clock.advance(chrono::Duration::hours(2));
    let mut manager = open_manager(&dir, clock.clone());
    assert_eq!(manager.init(), SessionState::Active);
    assert_eq!(manager.record().unwrap().token, token);
    assert_eq!(manager.profile().unwrap().goal, Goal::WeightLoss);
    let texts: Vec<&str> = manager
        .conversation()
        .turns()
        .iter()
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(texts, vec!["how many carbs?", "Around half your plate."]);
}

#[test]
fn test_expired_record_is_discarded_on_init() {
    let dir = TempDir::new().unwrap();
    let clock = common::manual_clock();
    {
        let mut manager = open_manager(&dir, clock.clone());
        manager.create(common::profile(Goal::Maintenance));
    }

    clock.advance(chrono::Duration::hours(25));
    let mut manager = open_manager(&dir, clock.clone());
    assert_eq!(manager.init(), SessionState::Uninitialized);
    assert!(manager.profile().is_none());
    drop(manager);

    let store = SledSessionStore::open(dir.path().join("session.db")).unwrap();
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn test_malformed_record_is_discarded() {
    let clock = common::manual_clock();
    let store = MemorySessionStore::with_blob(b"{ not json".to_vec());
    let mut manager = SessionManager::from_config(&Config::default(), Box::new(store), clock);

    assert_eq!(manager.init(), SessionState::Uninitialized);
    assert!(manager.record().is_none());
    assert!(manager.conversation().is_empty());
}

#[test]
fn test_logout_clears_persisted_session() {
    let dir = TempDir::new().unwrap();
    let clock = common::manual_clock();
    {
        let mut manager = open_manager(&dir, clock.clone());
        manager.create(common::profile(Goal::Maintenance));
        manager.logout();
        assert_eq!(manager.state(), SessionState::Uninitialized);
    }

    let mut manager = open_manager(&dir, clock);
    assert_eq!(manager.init(), SessionState::Uninitialized);
}

#[test]
fn test_saved_intervention_reaches_session_and_journal() {
    let dir = TempDir::new().unwrap();
    let clock = common::manual_clock();
    let engine = CoachEngine::local();
    let profile = common::profile(Goal::Maintenance);

    let mut machine = InterventionMachine::new(InterventionConfig::default(), clock.clone());
    let entry = MoodEntry::new(clock_now(&clock), 1, Some(Mood::Stressed), "deadline");
    machine.trigger(entry, Mood::Stressed, engine.retrieval(), &profile);
    machine.advance(Category::Activities);
    assert!(machine.react(Category::Activities, Reaction::Helped));
    let saved = machine.close(CloseOutcome::Save).expect("saved intervention");

    {
        let mut manager = open_manager(&dir, clock.clone());
        manager.create(profile);
        manager.record_mood(saved.clone()).unwrap();
    }
    let journal = MoodJournal::in_dir(dir.path()).unwrap();
    journal.save(&saved).unwrap();

    let mut manager = open_manager(&dir, clock);
    manager.init();
    assert_eq!(manager.mood_history().len(), 1);
    assert_eq!(manager.mood_history()[0].entry.note, "deadline");

    let entries = journal.list(10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].mood, Mood::Stressed);
    assert_eq!(entries[0].helped_count, 1);

    let prefix: String = saved.entry.id.chars().take(8).collect();
    let loaded = journal.load(&prefix).unwrap().expect("loaded by prefix");
    assert_eq!(loaded, saved);

    assert_eq!(journal.delete(&saved.entry.id).unwrap(), 1);
    assert_eq!(journal.count().unwrap(), 0);
}

fn clock_now(clock: &std::sync::Arc<coachkit::clock::ManualClock>) -> chrono::DateTime<chrono::Utc> {
    use coachkit::clock::Clock;
    clock.now()
}
