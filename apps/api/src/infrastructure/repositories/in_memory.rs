use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::Entity;
use crate::domain::errors::RepositoryError;
use crate::domain::pagination::{list_entities, Page, PageRequest};
use crate::domain::repositories::{CrudRepository, UserRepository};
use crate::domain::user::User;

/// In-process implementation of the repository ports
///
/// Each call holds the store lock for its whole duration, so a write is
/// either fully applied or not applied at all. Unique keys declared by the
/// entity are enforced the way the SQL unique indexes are.
pub struct InMemoryRepository<E: Entity> {
    rows: RwLock<Vec<E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    fn check_unique(rows: &[E], candidate: &E) -> Result<(), RepositoryError> {
        if rows
            .iter()
            .any(|row| row.id() == candidate.id())
        {
            return Err(RepositoryError::Conflict(format!(
                "{} id {} already exists",
                E::KIND,
                candidate.id()
            )));
        }

        let keys = candidate.unique_keys();
        for row in rows {
            for (field, value) in row.unique_keys() {
                if keys.iter().any(|(f, v)| *f == field && *v == value) {
                    return Err(RepositoryError::Conflict(format!(
                        "{} {} already exists",
                        field, value
                    )));
                }
            }
        }

        Ok(())
    }

    async fn find_where(&self, predicate: impl Fn(&E) -> bool) -> Option<E> {
        self.rows
            .read()
            .await
            .iter()
            .find(|row| predicate(row))
            .cloned()
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> CrudRepository<E> for InMemoryRepository<E> {
    async fn insert(&self, entity: &E) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        Self::check_unique(&rows, entity)?;
        rows.push(entity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>, RepositoryError> {
        Ok(self.find_where(|row| row.id() == id).await)
    }

    async fn list(&self, filter: &E::Filter, page: PageRequest) -> Result<Page<E>, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(list_entities(rows.iter().cloned(), filter, page))
    }

    async fn update(&self, id: Uuid, patch: &E::Patch) -> Result<Option<E>, RepositoryError> {
        let mut rows = self.rows.write().await;
        let Some(index) = rows.iter().position(|row| row.id() == id) else {
            return Ok(None);
        };

        let mut updated = rows[index].clone();
        updated.apply(patch);

        let others: Vec<E> = rows
            .iter()
            .filter(|row| row.id() != id)
            .cloned()
            .collect();
        Self::check_unique(&others, &updated)?;

        rows[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() != before)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let username = username.to_lowercase();
        Ok(self
            .find_where(|user| user.username.as_str().to_lowercase() == username)
            .await)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let email = email.to_lowercase();
        Ok(self
            .find_where(|user| user.email.as_str().to_lowercase() == email)
            .await)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let login = login.to_lowercase();
        Ok(self
            .find_where(|user| {
                user.username.as_str().to_lowercase() == login
                    || user.email.as_str().to_lowercase() == login
            })
            .await)
    }
}
