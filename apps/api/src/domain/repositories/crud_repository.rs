use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::Entity;
use crate::domain::errors::RepositoryError;
use crate::domain::pagination::{Page, PageRequest};

/// Persistence contract for any entity served by the CRUD pipeline
///
/// Every mutating method is atomic: implementations run it in a single
/// transaction and roll back on any failure before returning the error.
#[async_trait]
pub trait CrudRepository<E: Entity>: Send + Sync {
    /// Insert a new entity
    async fn insert(&self, entity: &E) -> Result<(), RepositoryError>;

    /// Find an entity by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>, RepositoryError>;

    /// Filter, order (newest first, ties by id) and slice entities
    async fn list(&self, filter: &E::Filter, page: PageRequest) -> Result<Page<E>, RepositoryError>;

    /// Apply a patch to an existing entity, returning `None` if it does not exist
    async fn update(&self, id: Uuid, patch: &E::Patch) -> Result<Option<E>, RepositoryError>;

    /// Delete an entity by ID, returning `false` if it did not exist
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
