use applicant::{AuthError, FieldValue, Fields, IdentityProvider, Query, RecordStore, StoreError};
use backend::MemoryBackend;
use pretty_assertions::assert_eq;

fn record(pairs: &[(&str, &str)]) -> Fields {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), FieldValue::from(*value)))
        .collect()
}

#[tokio::test]
async fn accounts_sign_up_and_sign_in() {
    let backend = MemoryBackend::new();

    let created = backend.sign_up("aru@mail.kz", "secret1").await.unwrap();
    assert_eq!(created.email, "aru@mail.kz");

    let signed_in = backend.sign_in("aru@mail.kz", "secret1").await.unwrap();
    assert_eq!(signed_in.uid, created.uid);

    assert_eq!(
        backend.sign_up("aru@mail.kz", "another1").await,
        Err(AuthError::EmailInUse)
    );
    assert_eq!(
        backend.sign_in("aru@mail.kz", "wrong-password").await,
        Err(AuthError::WrongPassword)
    );
    assert_eq!(
        backend.sign_in("nobody@mail.kz", "secret1").await,
        Err(AuthError::NotFound)
    );
}

#[tokio::test]
async fn sign_up_rules() {
    let backend = MemoryBackend::new();
    assert_eq!(
        backend.sign_up("aru@mail.kz", "12345").await,
        Err(AuthError::WeakPassword)
    );
    assert_eq!(
        backend.sign_up("not-an-email", "secret1").await,
        Err(AuthError::InvalidEmail)
    );
}

#[tokio::test]
async fn records_are_queried_by_equality() {
    let backend = MemoryBackend::new();
    backend
        .put_record("applications", "r1", record(&[("userId", "u1"), ("vacancyId", "v1")]))
        .await
        .unwrap();
    backend
        .put_record("applications", "r2", record(&[("userId", "u2"), ("vacancyId", "v1")]))
        .await
        .unwrap();
    let created = backend
        .create_record("applications", record(&[("userId", "u1"), ("vacancyId", "v2")]))
        .await
        .unwrap();

    let mine = backend
        .query_records("applications", &Query::all().eq("userId", "u1"))
        .await
        .unwrap();
    let mut ids: Vec<_> = mine.iter().map(|doc| doc.id.clone()).collect();
    ids.sort();
    let mut expected = vec!["r1".to_string(), created];
    expected.sort();
    assert_eq!(ids, expected);

    assert!(
        backend
            .query_records("vacancies", &Query::all())
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(backend.get_record("applications", "missing").await, Ok(None));
}

#[tokio::test]
async fn snapshot_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("store.json");

    let uid = {
        let backend = MemoryBackend::open(&path).unwrap();
        let identity = backend.sign_up("aru@mail.kz", "secret1").await.unwrap();
        backend
            .put_record("users", &identity.uid, record(&[("city", "Алматы")]))
            .await
            .unwrap();
        identity.uid
    };
    assert!(path.exists());

    let reopened = MemoryBackend::open(&path).unwrap();
    let identity = reopened.sign_in("aru@mail.kz", "secret1").await.unwrap();
    assert_eq!(identity.uid, uid);
    let profile = reopened.get_record("users", &uid).await.unwrap().unwrap();
    assert_eq!(profile.text("city"), Some("Алматы"));
}

#[tokio::test]
async fn corrupt_snapshot_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        MemoryBackend::open(&path),
        Err(backend::BackendError::Snapshot { .. })
    ));
}

#[tokio::test]
async fn offline_calls_fail_as_network_errors() {
    let backend = MemoryBackend::new();
    backend.seed("vacancies", "v1", record(&[("title", "Lifeguard")])).await.unwrap();
    backend.set_offline(true);

    assert!(matches!(
        backend.get_record("vacancies", "v1").await,
        Err(StoreError::Network(_))
    ));
    assert!(matches!(
        backend.sign_in("aru@mail.kz", "secret1").await,
        Err(AuthError::Network(_))
    ));

    backend.set_offline(false);
    assert!(backend.get_record("vacancies", "v1").await.unwrap().is_some());
    assert_eq!(backend.count("vacancies").await, 1);
}

#[tokio::test]
async fn failed_snapshot_write_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    // The snapshot directory is a regular file, so every write fails.
    let backend = MemoryBackend::open(blocker.join("store.json")).unwrap();

    assert!(
        backend
            .put_record("applicants", "u1", record(&[("status", "В ожидании")]))
            .await
            .is_err()
    );
    assert_eq!(backend.get_record("applicants", "u1").await, Ok(None));

    assert!(
        backend
            .create_record("applications", record(&[("userId", "u1")]))
            .await
            .is_err()
    );
    assert_eq!(backend.count("applications").await, 0);

    assert!(matches!(
        backend.sign_up("aru@mail.kz", "secret1").await,
        Err(AuthError::Unknown(_))
    ));
    assert_eq!(
        backend.sign_in("aru@mail.kz", "secret1").await,
        Err(AuthError::NotFound)
    );
}

#[tokio::test]
async fn update_keeps_other_fields() {
    let backend = MemoryBackend::new();
    backend
        .seed("users", "u1", record(&[("city", "Алматы"), ("avatar", "u1.png")]))
        .await
        .unwrap();

    backend
        .update_record("users", "u1", record(&[("city", "Тараз")]))
        .await
        .unwrap();
    let profile = backend.get_record("users", "u1").await.unwrap().unwrap();
    assert_eq!(profile.text("city"), Some("Тараз"));
    assert_eq!(profile.text("avatar"), Some("u1.png"));

    assert!(matches!(
        backend
            .update_record("users", "u2", record(&[("city", "Тараз")]))
            .await,
        Err(StoreError::NotFound { .. })
    ));
    assert_eq!(backend.count("users").await, 1);
}
