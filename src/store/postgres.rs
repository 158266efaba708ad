use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskChanges, User, UserChanges};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, description, is_completed, owner_id, created_at, updated_at";

/// PostgreSQL-backed store for both users and tasks.
///
/// Uniqueness of `username`/`email` and the `tasks.owner_id` cascade are
/// enforced by the schema in `migrations/`; constraint violations are turned
/// into coded errors by `From<sqlx::Error> for AppError`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(
        options: PgConnectOptions,
        max_connections: u32,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.username)
            .bind(user.email)
            .bind(user.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, AppError> {
        if changes.is_empty() {
            return UserStore::find_by_id(self, id).await;
        }

        let sql = format!(
            "UPDATE users \
             SET username = COALESCE($2, username), email = COALESCE($3, email), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.username)
            .bind(changes.email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, owner_id) VALUES ($1, $2, $3) RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task.title)
            .bind(task.description)
            .bind(task.owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE owner_id = $1 ORDER BY id",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_scoped(&self, id: i32, owner_id: i32) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update_scoped(
        &self,
        id: i32,
        owner_id: i32,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        if changes.is_empty() {
            return self.find_scoped(id, owner_id).await;
        }

        let sql = format!(
            "UPDATE tasks \
             SET title = COALESCE($3, title), \
                 description = CASE WHEN $4::BOOLEAN THEN $5::TEXT ELSE description END, \
                 is_completed = COALESCE($6, is_completed), \
                 updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {}",
            TASK_COLUMNS
        );
        let (replace_description, description) = match changes.description {
            Some(description) => (true, description),
            None => (false, None),
        };
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(changes.title)
            .bind(replace_description)
            .bind(description)
            .bind(changes.is_completed)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_scoped(&self, id: i32, owner_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Connects to `DATABASE_URL` and applies the migrations. Run with
    /// `cargo test -- --ignored` against a disposable database.
    async fn store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PgStore::connect(url.parse().expect("valid DATABASE_URL"), 2)
            .await
            .expect("database reachable");
        store.migrate().await.expect("migrations apply");
        store
    }

    fn unique(prefix: &str) -> String {
        format!(
            "{}_{}",
            prefix,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        )
    }

    async fn insert_user(store: &PgStore, name: &str) -> User {
        UserStore::insert(
            store,
            NewUser {
                username: name.to_string(),
                email: format!("{}@example.com", name),
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[actix_rt::test]
    #[ignore]
    async fn test_unique_constraints_surface_as_conflict() {
        let store = store().await;
        let name = unique("pg_alice");
        let alice = insert_user(&store, &name).await;

        let duplicate_email = UserStore::insert(
            &store,
            NewUser {
                username: unique("pg_other"),
                email: alice.email.clone(),
                password_hash: "hash".into(),
            },
        )
        .await;
        match duplicate_email {
            Err(AppError::Conflict(message)) => assert_eq!(message, "Email already in use"),
            other => panic!("expected Conflict, got {:?}", other),
        }

        let duplicate_name = UserStore::insert(
            &store,
            NewUser {
                username: name.clone(),
                email: format!("{}@other.example.com", name),
                password_hash: "hash".into(),
            },
        )
        .await;
        match duplicate_name {
            Err(AppError::Conflict(message)) => assert_eq!(message, "Username already in use"),
            other => panic!("expected Conflict, got {:?}", other),
        }

        assert!(UserStore::delete(&store, alice.id).await.unwrap());
    }

    #[actix_rt::test]
    #[ignore]
    async fn test_task_partial_updates_and_cascade() {
        let store = store().await;
        let owner = insert_user(&store, &unique("pg_owner")).await;
        let task = TaskStore::insert(
            &store,
            NewTask {
                owner_id: owner.id,
                title: "Buy milk".into(),
                description: Some("Two litres".into()),
            },
        )
        .await
        .unwrap();
        assert!(!task.is_completed);

        let completed = store
            .update_scoped(
                task.id,
                owner.id,
                TaskChanges {
                    is_completed: Some(true),
                    ..TaskChanges::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(completed.is_completed);
        assert_eq!(completed.description.as_deref(), Some("Two litres"));

        let cleared = store
            .update_scoped(
                task.id,
                owner.id,
                TaskChanges {
                    title: Some("Buy oat milk".into()),
                    description: Some(None),
                    ..TaskChanges::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleared.title, "Buy oat milk");
        assert_eq!(cleared.description, None);
        assert!(cleared.is_completed);

        assert!(store
            .find_scoped(task.id, owner.id + 1_000_000)
            .await
            .unwrap()
            .is_none());

        let long_title = "x".repeat(300);
        let long = TaskStore::insert(
            &store,
            NewTask {
                owner_id: owner.id,
                title: long_title.clone(),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(long.title, long_title);

        assert!(UserStore::delete(&store, owner.id).await.unwrap());
        assert!(store.list_for_owner(owner.id).await.unwrap().is_empty());

        let orphan = TaskStore::insert(
            &store,
            NewTask {
                owner_id: owner.id,
                title: "Orphan".into(),
                description: None,
            },
        )
        .await;
        match orphan {
            Err(AppError::NotFound(message)) => assert_eq!(message, "User not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[actix_rt::test]
    #[ignore]
    async fn test_user_update_coalesces_missing_fields() {
        let store = store().await;
        let user = insert_user(&store, &unique("pg_bob")).await;
        let new_email = format!("{}@renamed.example.com", user.username);

        let updated = store
            .update(
                user.id,
                UserChanges {
                    email: Some(new_email.clone()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.username, user.username);
        assert_eq!(updated.email, new_email);
        assert!(store.update(-1, UserChanges::default()).await.unwrap().is_none());

        assert!(UserStore::delete(&store, user.id).await.unwrap());
    }
}
