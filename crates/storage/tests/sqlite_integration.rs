use progress_core::model::{PageNumber, Session};
use progress_core::time::fixed_now;
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;
use storage::SessionRecord;
use storage::record::parse_session;

#[tokio::test]
async fn sqlite_set_get_remove_round_trip() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("lesanimaux_session").await.unwrap(), None);

    repo.set("lesanimaux_session", "first").await.unwrap();
    repo.set("lesanimaux_session", "second").await.unwrap();
    assert_eq!(
        repo.get("lesanimaux_session").await.unwrap().as_deref(),
        Some("second")
    );

    repo.remove("lesanimaux_session").await.unwrap();
    assert_eq!(repo.get("lesanimaux_session").await.unwrap(), None);

    // removing a missing key stays quiet
    repo.remove("lesanimaux_session").await.unwrap();
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn sqlite_storage_keeps_session_records_per_key() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_records?mode=memory&cache=shared")
        .await
        .expect("storage");

    let mut session = Session::new(fixed_now());
    session.mark(PageNumber::new(7));
    session.mark(PageNumber::new(3));
    let json = SessionRecord::from_session(&session).to_json().unwrap();

    storage.local.set("animals", &json).await.unwrap();
    storage.local.set("kitchen", "{}").await.unwrap();

    let stored = storage.local.get("animals").await.unwrap().expect("stored");
    let decoded = parse_session(&stored, fixed_now()).unwrap();
    assert_eq!(decoded, session);
    assert_eq!(
        storage.local.get("kitchen").await.unwrap().as_deref(),
        Some("{}")
    );
}
