use crate::db::models::{DbRole, DbSession, DbUser, normalize};
use crate::db::schema::{IDENTITY_INIT, statements};
use crate::error::BackendError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

pub type SqlitePool = Pool<Sqlite>;

/// Open a pool for `database_url`, creating the file when missing.
///
/// In-memory databases are pinned to a single connection that never expires,
/// otherwise every pooled connection would see its own empty database.
pub async fn connect(database_url: &str) -> Result<SqlitePool, BackendError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_opts = SqlitePoolOptions::new();
    if is_in_memory(database_url) {
        pool_opts = pool_opts
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    Ok(pool_opts.connect_with(connect_opts).await?)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Users, roles and cookie sessions.
#[derive(Clone)]
pub struct IdentityStorage {
    pool: SqlitePool,
}

impl IdentityStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), BackendError> {
        for stmt in statements(IDENTITY_INIT) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn create_user(
        &self,
        email: &str,
        password_hash: String,
        email_confirmed: bool,
    ) -> Result<DbUser, BackendError> {
        let user = DbUser {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_string(),
            normalized_email: normalize(email),
            password_hash,
            email_confirmed,
            security_stamp: Uuid::new_v4().simple().to_string().to_uppercase(),
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, normalized_email, password_hash,
                email_confirmed, security_stamp, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.normalized_email)
        .bind(&user.password_hash)
        .bind(user.email_confirmed)
        .bind(&user.security_stamp)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => BackendError::validation(
                "DuplicateUserName",
                format!("Username '{}' is already taken.", user.email),
            ),
            other => other.into(),
        })?;
        debug!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<DbUser>, BackendError> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"SELECT id, email, normalized_email, password_hash,
               email_confirmed, security_stamp, created_at
               FROM users WHERE normalized_email = ?"#,
        )
        .bind(normalize(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<DbUser>, BackendError> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"SELECT id, email, normalized_email, password_hash,
               email_confirmed, security_stamp, created_at
               FROM users WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Return the role named `name`, creating it when absent.
    pub async fn ensure_role(&self, name: &str) -> Result<DbRole, BackendError> {
        sqlx::query(
            "INSERT INTO roles (id, name, normalized_name) VALUES (?, ?, ?)
             ON CONFLICT(normalized_name) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name.trim())
        .bind(normalize(name))
        .execute(&self.pool)
        .await?;

        let role = sqlx::query_as::<_, DbRole>(
            "SELECT id, name, normalized_name FROM roles WHERE normalized_name = ?",
        )
        .bind(normalize(name))
        .fetch_one(&self.pool)
        .await?;
        Ok(role)
    }

    /// Add a membership; the role is created if needed. Re-adding is a no-op.
    pub async fn add_to_role(&self, user_id: &str, role_name: &str) -> Result<(), BackendError> {
        let role = self.ensure_role(role_name).await?;
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(&role.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Role names of a user, ordered by name.
    pub async fn roles_for_user(&self, user_id: &str) -> Result<Vec<String>, BackendError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"SELECT r.name FROM roles r
               JOIN user_roles ur ON ur.role_id = r.id
               WHERE ur.user_id = ?
               ORDER BY r.name"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    pub async fn create_session(
        &self,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<DbSession, BackendError> {
        let session = DbSession {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            expires_at,
        };
        sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&session.id)
            .bind(&session.user_id)
            .bind(session.created_at)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;
        Ok(session)
    }

    /// Look up a session that has not expired yet. Expired rows are removed.
    pub async fn find_active_session(&self, id: &str) -> Result<Option<DbSession>, BackendError> {
        let session = sqlx::query_as::<_, DbSession>(
            "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match session {
            Some(s) if s.is_expired(Utc::now()) => {
                self.delete_session(&s.id).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Returns true when a row was removed.
    pub async fn delete_session(&self, id: &str) -> Result<bool, BackendError> {
        let res = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn storage() -> IdentityStorage {
        let pool = connect("sqlite::memory:").await.expect("open in-memory db");
        let storage = IdentityStorage::new(pool);
        storage.init_schema().await.expect("init schema");
        storage
    }

    #[tokio::test]
    async fn email_lookup_is_case_insensitive() {
        let storage = storage().await;
        let user = storage
            .create_user("Leela@Contoso.com", "hash".to_string(), true)
            .await
            .unwrap();

        let found = storage
            .find_user_by_email("leela@contoso.COM")
            .await
            .unwrap()
            .expect("user found");
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "Leela@Contoso.com");
        assert!(found.email_confirmed);
    }

    #[tokio::test]
    async fn role_membership_is_idempotent() {
        let storage = storage().await;
        let user = storage
            .create_user("harry@contoso.com", "hash".to_string(), false)
            .await
            .unwrap();

        storage.add_to_role(&user.id, "Manager").await.unwrap();
        storage.add_to_role(&user.id, "manager").await.unwrap();
        storage.add_to_role(&user.id, "Administrator").await.unwrap();

        let roles = storage.roles_for_user(&user.id).await.unwrap();
        assert_eq!(roles, vec!["Administrator", "Manager"]);
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_validation_error() {
        let storage = storage().await;
        storage
            .create_user("dup@contoso.com", "hash".to_string(), false)
            .await
            .unwrap();

        let err = storage
            .create_user("DUP@contoso.com", "hash".to_string(), false)
            .await
            .unwrap_err();
        match err {
            BackendError::Validation(errors) => assert!(errors.contains_key("DuplicateUserName")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn expired_sessions_are_not_returned() {
        let storage = storage().await;
        let user = storage
            .create_user("a@b.c", "hash".to_string(), false)
            .await
            .unwrap();

        let live = storage
            .create_session(&user.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        let stale = storage
            .create_session(&user.id, Utc::now() - Duration::hours(1))
            .await
            .unwrap();

        assert!(storage.find_active_session(&live.id).await.unwrap().is_some());
        assert!(storage.find_active_session(&stale.id).await.unwrap().is_none());
        assert!(!storage.delete_session(&stale.id).await.unwrap());
        assert!(storage.delete_session(&live.id).await.unwrap());
    }
}
