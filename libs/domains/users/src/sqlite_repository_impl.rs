use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectionTrait, DbBackend, FromQueryResult, Statement};

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;
use crate::values::{Email, UserId};

/// SQLite implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct SqliteUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl SqliteUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    created_at: String,
    updated_at: String,
}

// Fixed-width RFC 3339 with millisecond precision and a Z suffix, so the
// TEXT column sorts chronologically.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> UserResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| UserError::Storage(format!("Invalid stored timestamp '{}': {}", raw, e)))
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> UserResult<User> {
        User::reconstitute(
            UserId::parse(&row.id)?,
            Email::parse(&row.email)?,
            &row.name,
            parse_timestamp(&row.created_at)?,
            parse_timestamp(&row.updated_at)?,
        )
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: &UserId) -> UserResult<Option<User>> {
        let sql = "SELECT id, email, name, created_at, updated_at FROM users WHERE id = ?";

        let stmt = Statement::from_sql_and_values(DbBackend::Sqlite, sql, [id.as_str().into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(UserError::from)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> UserResult<Option<User>> {
        let sql = "SELECT id, email, name, created_at, updated_at FROM users WHERE email = ?";

        let stmt =
            Statement::from_sql_and_values(DbBackend::Sqlite, sql, [email.as_str().into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(UserError::from)?;

        row.map(User::try_from).transpose()
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let sql =
            "SELECT id, email, name, created_at, updated_at FROM users ORDER BY created_at DESC";

        let stmt = Statement::from_sql_and_values(DbBackend::Sqlite, sql, []);

        let rows = UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(UserError::from)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn save(&self, user: &User) -> UserResult<()> {
        // Upsert keyed by id. created_at is only written on insert so the
        // original creation time survives updates.
        let sql = r#"
            INSERT INTO users (id, email, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                updated_at = excluded.updated_at
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Sqlite,
            sql,
            [
                user.id().as_str().into(),
                user.email().as_str().into(),
                user.name().into(),
                format_timestamp(user.created_at()).into(),
                format_timestamp(user.updated_at()).into(),
            ],
        );

        self.db.execute(stmt).await.map_err(|e| {
            // The unique index on email is the last line of defense against
            // two requests racing past the service-level uniqueness check.
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint failed: users.email") {
                UserError::DuplicateEmail(user.email().to_string())
            } else {
                UserError::Storage(msg)
            }
        })?;

        tracing::debug!(user_id = %user.id(), email = %user.email(), "Saved user");
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> UserResult<()> {
        let sql = "DELETE FROM users WHERE id = ?";

        let stmt = Statement::from_sql_and_values(DbBackend::Sqlite, sql, [id.as_str().into()]);

        self.db.execute(stmt).await.map_err(UserError::from)?;

        Ok(())
    }

    async fn exists(&self, id: &UserId) -> UserResult<bool> {
        let sql = "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?) as present";

        let stmt = Statement::from_sql_and_values(DbBackend::Sqlite, sql, [id.as_str().into()]);

        #[derive(FromQueryResult)]
        struct ExistsResult {
            present: bool,
        }

        let result = ExistsResult::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(UserError::from)?;

        Ok(result.map(|r| r.present).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::sqlite::{connect_with_options, run_migrations, ConnectOptions};
    use migration::Migrator;

    // A pool of in-memory SQLite connections would open one database per
    // connection, so tests pin the pool to a single connection.
    async fn repo() -> SqliteUserRepository {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let db = connect_with_options(options).await.unwrap();
        run_migrations::<Migrator>(&db, "users_test").await.unwrap();
        SqliteUserRepository::new(db)
    }

    fn user(email: &str, name: &str) -> User {
        User::create(Email::parse(email).unwrap(), name).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let repo = repo().await;

        let u = user("test@example.com", "Test User");
        repo.save(&u).await.unwrap();

        let fetched = repo.find_by_id(u.id()).await.unwrap().unwrap();
        assert_eq!(fetched.id(), u.id());
        assert_eq!(fetched.email().as_str(), "test@example.com");
        assert_eq!(fetched.name(), "Test User");
    }

    #[tokio::test]
    async fn test_timestamps_survive_round_trip() {
        let repo = repo().await;

        let u = user("test@example.com", "Test User");
        repo.save(&u).await.unwrap();

        let fetched = repo.find_by_id(u.id()).await.unwrap().unwrap();
        // Stored at millisecond precision
        assert_eq!(
            fetched.created_at().timestamp_millis(),
            u.created_at().timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let repo = repo().await;

        let fetched = repo.find_by_id(&UserId::generate()).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = repo().await;

        let u = user("alice@example.com", "Alice");
        repo.save(&u).await.unwrap();

        let email = Email::parse("alice@example.com").unwrap();
        let fetched = repo.find_by_email(&email).await.unwrap();
        assert!(fetched.is_some());

        let other = Email::parse("bob@example.com").unwrap();
        assert!(repo.find_by_email(&other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_preserves_created_at() {
        let repo = repo().await;

        let u = user("test@example.com", "Before");
        repo.save(&u).await.unwrap();

        let renamed = u.rename("After").unwrap();
        repo.save(&renamed).await.unwrap();

        let fetched = repo.find_by_id(u.id()).await.unwrap().unwrap();
        assert_eq!(fetched.name(), "After");
        assert_eq!(
            fetched.created_at().timestamp_millis(),
            u.created_at().timestamp_millis()
        );
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unique_email_index_maps_to_duplicate_email() {
        let repo = repo().await;

        repo.save(&user("taken@example.com", "First")).await.unwrap();

        // Different id, same email: the insert hits the unique index
        let result = repo.save(&user("taken@example.com", "Second")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_find_all_newest_first() {
        let repo = repo().await;

        let first = user("first@example.com", "First");
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = user("second@example.com", "Second");

        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].email().as_str(), "second@example.com");
        assert_eq!(all[1].email().as_str(), "first@example.com");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = repo().await;

        let u = user("test@example.com", "Test User");
        repo.save(&u).await.unwrap();

        repo.delete(u.id()).await.unwrap();
        assert!(!repo.exists(u.id()).await.unwrap());

        repo.delete(u.id()).await.unwrap();
    }

    #[tokio::test]
    async fn test_exists() {
        let repo = repo().await;

        let u = user("test@example.com", "Test User");
        assert!(!repo.exists(u.id()).await.unwrap());

        repo.save(&u).await.unwrap();
        assert!(repo.exists(u.id()).await.unwrap());
    }
}
