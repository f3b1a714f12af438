//! Session persistence integration tests.

use herbal_clinic_core::session::{Landing, Session, SessionStore, TokenPair, UserType};

fn logistic_session() -> Session {
    let pair: TokenPair = serde_json::from_str(
        r#"{"access": "acc-1", "refresh": "ref-1", "user_type": "logistic"}"#,
    )
    .unwrap();
    pair.into_session("depo")
}

#[test]
fn test_session_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.db");

    {
        let store = SessionStore::open(&path).unwrap();
        store.save(&logistic_session()).unwrap();
    }

    let store = SessionStore::open(&path).unwrap();
    let restored = store.load().unwrap().unwrap();
    assert_eq!(restored, logistic_session());
    assert_eq!(restored.user_type, UserType::Logistic);
    assert_eq!(restored.landing(), Landing::LogisticsDashboard);
}

#[test]
fn test_logout_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.db");

    let store = SessionStore::open(&path).unwrap();
    store.save(&logistic_session()).unwrap();
    assert!(store.clear().unwrap());
    drop(store);

    let store = SessionStore::open(&path).unwrap();
    assert!(store.load().unwrap().is_none());
}
