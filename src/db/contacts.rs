use crate::db::models::{Contact, NewContact};
use crate::db::schema::{CONTACTS_INIT, statements};
use crate::db::sqlite::SqlitePool;
use crate::error::BackendError;
use crate::seed::contacts::SeedContacts;
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info};

const INSERT_CHUNK: usize = 100;

/// Create the contacts database when it does not exist yet and, only in that
/// case, fill it with `count` synthetic contacts.
///
/// Statement logging is switched off on `options` so the bulk insert does not
/// flood the log. Returns `true` when the schema was created (and seeded) by
/// this call, `false` when it already existed and nothing was inserted. The
/// pool is closed before returning, on success and on error.
pub async fn ensure_seeded(options: SqliteConnectOptions, count: u32) -> Result<bool, BackendError> {
    let options = options.create_if_missing(true).disable_statement_logging();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    let storage = ContactsStorage::new(pool);

    let result = seed_if_created(&storage, count).await;
    storage.pool().close().await;
    result
}

async fn seed_if_created(storage: &ContactsStorage, count: u32) -> Result<bool, BackendError> {
    let created = storage.ensure_created().await?;
    if created {
        let contacts = SeedContacts::new().generate(count);
        storage.insert_many(contacts).await?;
        info!(count, "contacts database created and seeded");
    } else {
        debug!("contacts database already exists; seeding skipped");
    }
    Ok(created)
}

#[derive(Clone)]
pub struct ContactsStorage {
    pool: SqlitePool,
}

impl ContactsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the schema unless the `contacts` table is already there.
    /// The check and the DDL run in one transaction.
    pub async fn ensure_created(&self) -> Result<bool, BackendError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'contacts'",
        )
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            tx.rollback().await?;
            return Ok(false);
        }

        for stmt in statements(CONTACTS_INIT) {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(true)
    }

    /// Insert in chunks, one transaction per chunk. A failure leaves earlier
    /// chunks committed.
    pub async fn insert_many(&self, contacts: Vec<NewContact>) -> Result<u64, BackendError> {
        let mut inserted = 0;
        for chunk in contacts.chunks(INSERT_CHUNK) {
            let mut tx = self.pool.begin().await?;
            for c in chunk {
                sqlx::query(
                    r#"
                    INSERT INTO contacts (
                        title, first_name, last_name, phone,
                        street, city, state, zip_code
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&c.title)
                .bind(&c.first_name)
                .bind(&c.last_name)
                .bind(&c.phone)
                .bind(&c.street)
                .bind(&c.city)
                .bind(&c.state)
                .bind(&c.zip_code)
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
            inserted += chunk.len() as u64;
        }
        Ok(inserted)
    }

    pub async fn count(&self) -> Result<i64, BackendError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Contact>, BackendError> {
        let rows = sqlx::query_as::<_, Contact>(
            r#"SELECT id, title, first_name, last_name, phone, street, city, state, zip_code
               FROM contacts ORDER BY last_name, first_name, id LIMIT ? OFFSET ?"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
