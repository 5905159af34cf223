use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::{Entity, EntityMeta};
use crate::domain::errors::RepositoryError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::{CrudRepository, UserRepository};
use crate::domain::user::{Email, User, UserFilter, UserPatch, Username};
use crate::infrastructure::database::{like_pattern, map_sqlx_error};

const COLUMNS: &str = "id, created_at, username, email, password_hash, is_active, is_admin";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    username: String,
    email: String,
    password_hash: String,
    is_active: bool,
    is_admin: bool,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(&row.username)
            .map_err(|e| RepositoryError::Internal(format!("Invalid username from database: {}", e)))?;
        let email = Email::new(&row.email)
            .map_err(|e| RepositoryError::Internal(format!("Invalid email from database: {}", e)))?;

        Ok(User {
            meta: EntityMeta::from_persistence(row.id, row.created_at),
            username,
            email,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_admin: row.is_admin,
        })
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    builder.push(" WHERE TRUE");
    if let Some(username) = &filter.username {
        builder
            .push(" AND username ILIKE ")
            .push_bind(like_pattern(username));
    }
    if let Some(email) = &filter.email {
        builder.push(" AND email ILIKE ").push_bind(like_pattern(email));
    }
    if let Some(is_active) = filter.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
}

/// PostgreSQL implementation of UserRepository
///
/// Username and email uniqueness is enforced by the `LOWER(..)` unique
/// indexes; lookups compare the same way.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, clause: &str, value: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE {}",
            COLUMNS, clause
        ))
        .bind(value.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find user", e))?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl CrudRepository<User> for PostgresUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, created_at, username, email, password_hash, is_active, is_admin
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id())
        .bind(user.created_at())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_admin)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to create user", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit user", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find user by id", e))?;

        row.map(User::try_from).transpose()
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to count users", e))?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM users", COLUMNS));
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC, id ASC LIMIT ")
            .push_bind(i64::from(page.size()))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<UserRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list users", e))?;

        let items = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total.max(0) as u64, page))
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> Result<Option<User>, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to lock user", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut user = User::try_from(row)?;
        user.apply(patch);

        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, is_active = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to update user", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit user", e))?;

        Ok(Some(user))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("LOWER(username) = $1", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("LOWER(email) = $1", email).await
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("LOWER(username) = $1 OR LOWER(email) = $1", login)
            .await
    }
}
