use identity_backend::db::{ContactsStorage, connect, ensure_seeded};
use identity_backend::BackendError;
use sqlx::sqlite::SqliteConnectOptions;
use std::{
    fs,
    path::PathBuf,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_db_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "identity-backend-contacts-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

fn options(path: &PathBuf) -> SqliteConnectOptions {
    SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .expect("valid sqlite url")
}

async fn contact_count(path: &PathBuf) -> i64 {
    let pool = connect(&format!("sqlite:{}", path.display()))
        .await
        .expect("open contacts db");
    let storage = ContactsStorage::new(pool);
    let count = storage.count().await.expect("count contacts");
    storage.pool().close().await;
    count
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
    for suffix in ["-wal", "-shm"] {
        let _ = fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

#[tokio::test]
async fn fresh_database_is_seeded_with_exact_count() {
    let path = temp_db_path("fresh");

    let seeded = ensure_seeded(options(&path), 250)
        .await
        .expect("seeding failed");
    assert!(seeded);
    assert_eq!(contact_count(&path).await, 250);

    cleanup(&path);
}

#[tokio::test]
async fn existing_database_is_left_untouched() {
    let path = temp_db_path("rerun");

    assert!(ensure_seeded(options(&path), 30).await.expect("first run"));
    assert!(!ensure_seeded(options(&path), 75).await.expect("second run"));
    assert!(!ensure_seeded(options(&path), 30).await.expect("third run"));

    assert_eq!(contact_count(&path).await, 30);

    cleanup(&path);
}

#[tokio::test]
async fn zero_count_still_creates_schema_once() {
    let path = temp_db_path("zero");

    assert!(ensure_seeded(options(&path), 0).await.expect("first run"));
    assert_eq!(contact_count(&path).await, 0);
    assert!(!ensure_seeded(options(&path), 10).await.expect("second run"));
    assert_eq!(contact_count(&path).await, 0);

    cleanup(&path);
}

#[tokio::test]
async fn seeded_contacts_have_populated_fields() {
    let path = temp_db_path("fields");
    ensure_seeded(options(&path), 12).await.expect("seeding failed");

    let pool = connect(&format!("sqlite:{}", path.display()))
        .await
        .expect("open contacts db");
    let storage = ContactsStorage::new(pool);
    let page = storage.list(5, 0).await.expect("list contacts");
    assert_eq!(page.len(), 5);
    for c in &page {
        assert!(c.id > 0);
        assert!(!c.first_name.is_empty());
        assert!(!c.last_name.is_empty());
        assert_eq!(c.zip_code.len(), 5);
    }
    assert_eq!(storage.list(100, 10).await.expect("list tail").len(), 2);
    storage.pool().close().await;

    cleanup(&path);
}

#[tokio::test]
async fn failed_schema_creation_propagates_and_releases_database() {
    let path = temp_db_path("conflict");

    // a view named `contacts` is not a table, so creation runs and collides
    let pool = connect(&format!("sqlite:{}", path.display()))
        .await
        .expect("open contacts db");
    sqlx::query("CREATE VIEW contacts AS SELECT 1 AS id")
        .execute(&pool)
        .await
        .expect("create view");
    pool.close().await;

    let err = ensure_seeded(options(&path), 5)
        .await
        .expect_err("schema creation should fail");
    assert!(matches!(err, BackendError::Database(_)));

    let pool = connect(&format!("sqlite:{}", path.display()))
        .await
        .expect("reopen contacts db");
    sqlx::query("DROP VIEW contacts")
        .execute(&pool)
        .await
        .expect("drop view");
    pool.close().await;

    assert!(ensure_seeded(options(&path), 5).await.expect("retry"));
    assert_eq!(contact_count(&path).await, 5);

    cleanup(&path);
}
