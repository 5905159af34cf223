// Generic CRUD pipeline
// validate (by constructing Draft/Patch) → persist → translate storage outcomes

use tracing::{error, info, warn};
use uuid::Uuid;

use super::errors::ServiceError;
use crate::domain::entity::{Entity, EntityMeta};
use crate::domain::errors::RepositoryError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::CrudRepository;

fn translate<E: Entity>(action: &str, err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::Conflict(detail) => {
            warn!(kind = E::KIND, %detail, "{} rejected by uniqueness constraint", action);
            ServiceError::Conflict(format!(
                "{} already exists or violates a uniqueness constraint",
                E::KIND
            ))
        }
        RepositoryError::Internal(detail) => {
            error!(kind = E::KIND, %detail, "{} failed", action);
            ServiceError::Internal(format!(
                "An error occurred while {} the {}",
                action,
                E::KIND.to_lowercase()
            ))
        }
    }
}

fn not_found<E: Entity>(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("{} with id {} not found", E::KIND, id))
}

/// Creates an entity from a validated draft with fresh identity and timestamp
pub async fn create<E, R>(repo: &R, draft: E::Draft) -> Result<E, ServiceError>
where
    E: Entity,
    R: CrudRepository<E> + ?Sized,
{
    let entity = E::from_draft(EntityMeta::generate(), draft);

    repo.insert(&entity)
        .await
        .map_err(|e| translate::<E>("creating", e))?;

    info!(kind = E::KIND, id = %entity.id(), "created");
    Ok(entity)
}

/// Reads one entity by ID
pub async fn read_one<E, R>(repo: &R, id: Uuid) -> Result<E, ServiceError>
where
    E: Entity,
    R: CrudRepository<E> + ?Sized,
{
    repo.find_by_id(id)
        .await
        .map_err(|e| translate::<E>("reading", e))?
        .ok_or_else(|| not_found::<E>(id))
}

/// Lists entities matching `filter`, newest first, one page at a time
pub async fn read_many<E, R>(
    repo: &R,
    filter: &E::Filter,
    page: PageRequest,
) -> Result<Page<E>, ServiceError>
where
    E: Entity,
    R: CrudRepository<E> + ?Sized,
{
    repo.list(filter, page)
        .await
        .map_err(|e| translate::<E>("listing", e))
}

/// Applies a partial update; fields absent from the patch are left untouched
pub async fn update<E, R>(repo: &R, id: Uuid, patch: &E::Patch) -> Result<E, ServiceError>
where
    E: Entity,
    R: CrudRepository<E> + ?Sized,
{
    let entity = repo
        .update(id, patch)
        .await
        .map_err(|e| translate::<E>("updating", e))?
        .ok_or_else(|| not_found::<E>(id))?;

    info!(kind = E::KIND, %id, "updated");
    Ok(entity)
}

/// Deletes an entity by ID
pub async fn delete<E, R>(repo: &R, id: Uuid) -> Result<(), ServiceError>
where
    E: Entity,
    R: CrudRepository<E> + ?Sized,
{
    let deleted = repo
        .delete(id)
        .await
        .map_err(|e| translate::<E>("deleting", e))?;

    if !deleted {
        return Err(not_found::<E>(id));
    }

    info!(kind = E::KIND, %id, "deleted");
    Ok(())
}
