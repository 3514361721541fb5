use chrono::{Duration, TimeZone, Utc};
use parley_llm::Message;
use parley_persist::{Clock, InMemorySessionStore, ManualClock, SessionOwner, SessionStore};
use std::sync::Arc;

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()))
}

#[tokio::test]
async fn test_load_unknown_session_is_empty() {
    let store = InMemorySessionStore::new();
    assert!(store.load("sess_missing").await.unwrap().is_empty());
    assert!(store.get("sess_missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let store = InMemorySessionStore::new();
    let history = vec![Message::assistant("Hi!"), Message::user("hello"), Message::assistant("Hey")];

    store.save("sess_a", history.clone(), None).await.unwrap();

    assert_eq!(store.load("sess_a").await.unwrap(), history);
}

#[tokio::test]
async fn test_save_caps_history_at_one_hundred() {
    let store = InMemorySessionStore::new();
    let history: Vec<Message> = (0..150).map(|i| Message::user(format!("msg {i}"))).collect();

    store.save("sess_big", history, None).await.unwrap();

    let loaded = store.load("sess_big").await.unwrap();
    assert_eq!(loaded.len(), 100);
    assert_eq!(loaded.first().unwrap().content, "msg 50");
    assert_eq!(loaded.last().unwrap().content, "msg 149");
}

#[tokio::test]
async fn test_owner_recorded_only_on_create() {
    let clock = clock();
    let store = InMemorySessionStore::with_clock(clock.clone());
    let owner = SessionOwner::new().with_user_id("42").with_bot_name("Helper");

    store
        .save("sess_o", vec![Message::user("a")], Some(&owner))
        .await
        .unwrap();
    clock.advance(Duration::minutes(5));
    let other = SessionOwner::new().with_user_id("99");
    store
        .save("sess_o", vec![Message::user("a"), Message::assistant("b")], Some(&other))
        .await
        .unwrap();

    let session = store.get("sess_o").await.unwrap().unwrap();
    assert_eq!(session.user_id.as_deref(), Some("42"));
    assert_eq!(session.bot_name.as_deref(), Some("Helper"));
    assert_eq!(session.message_count(), 2);
    assert_eq!(session.last_active - session.created_at, Duration::minutes(5));
}

#[tokio::test]
async fn test_delete_reports_removal() {
    let store = InMemorySessionStore::new();
    store.save("sess_d", vec![Message::user("x")], None).await.unwrap();

    assert!(store.delete("sess_d").await.unwrap());
    assert!(!store.delete("sess_d").await.unwrap());
    assert!(store.load("sess_d").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_listing_and_purge() {
    let clock = clock();
    let store = InMemorySessionStore::with_clock(clock.clone());

    store.save("sess_old", vec![Message::user("old")], None).await.unwrap();
    clock.advance(Duration::hours(2));
    store.save("sess_new", vec![Message::user("new")], None).await.unwrap();

    let threshold = clock.now() - Duration::hours(1);
    let stale = store.list_stale_before(threshold).await.unwrap();
    assert_eq!(stale, vec!["sess_old".to_string()]);

    assert_eq!(store.purge_inactive_since(threshold).await.unwrap(), 1);
    assert!(store.get("sess_old").await.unwrap().is_none());
    assert!(store.get("sess_new").await.unwrap().is_some());
}

#[tokio::test]
async fn test_list_for_user_newest_first() {
    let clock = clock();
    let store = InMemorySessionStore::with_clock(clock.clone());
    let owner = SessionOwner::new().with_user_id("7");

    for id in ["sess_1", "sess_2", "sess_3"] {
        store.save(id, vec![Message::user(id)], Some(&owner)).await.unwrap();
        clock.advance(Duration::minutes(1));
    }
    store.save("sess_x", vec![Message::user("x")], None).await.unwrap();

    let sessions = store.list_for_user("7", 2).await.unwrap();
    let ids: Vec<&str> = sessions.iter().map(|s| s.session_id.as_str()).collect();
    assert_eq!(ids, vec!["sess_3", "sess_2"]);
}

#[tokio::test]
async fn test_stats_buckets_by_activity() {
    let clock = clock();
    let store = InMemorySessionStore::with_clock(clock.clone());

    store
        .save("sess_week", vec![Message::user("a"), Message::assistant("b")], None)
        .await
        .unwrap();
    clock.advance(Duration::days(3));
    store.save("sess_today", vec![Message::user("c")], None).await.unwrap();
    clock.advance(Duration::hours(1));

    let stats = store.stats(clock.now()).await.unwrap();
    assert_eq!(stats.total_sessions, 2);
    assert_eq!(stats.active_last_day, 1);
    assert_eq!(stats.active_last_week, 2);
    assert_eq!(stats.total_messages, 3);
}
