use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::{Entity, EntityMeta};
use crate::domain::errors::RepositoryError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::CrudRepository;
use crate::domain::resource::{Resource, ResourceFilter, ResourceName, ResourcePatch};
use crate::infrastructure::database::{like_pattern, map_sqlx_error};

const COLUMNS: &str = "id, created_at, name, description, value, is_active";

#[derive(sqlx::FromRow)]
struct ResourceRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    name: String,
    description: Option<String>,
    value: Option<Decimal>,
    is_active: bool,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = RepositoryError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        let name = ResourceName::new(&row.name)
            .map_err(|e| RepositoryError::Internal(format!("Invalid resource name from database: {}", e)))?;

        Ok(Resource::from_persistence(
            EntityMeta::from_persistence(row.id, row.created_at),
            name,
            row.description,
            row.value,
            row.is_active,
        ))
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ResourceFilter) {
    builder.push(" WHERE TRUE");
    if let Some(name) = &filter.name {
        builder.push(" AND name ILIKE ").push_bind(like_pattern(name));
    }
    if let Some(is_active) = filter.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
}

/// PostgreSQL implementation of the Resource repository
///
/// Every mutation runs in its own transaction; an early return drops the
/// transaction, which rolls it back.
pub struct PostgresResourceRepository {
    pool: PgPool,
}

impl PostgresResourceRepository {
    /// Creates a new PostgresResourceRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrudRepository<Resource> for PostgresResourceRepository {
    async fn insert(&self, resource: &Resource) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO resources (id, created_at, name, description, value, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(resource.id())
        .bind(resource.created_at())
        .bind(resource.name().as_str())
        .bind(resource.description())
        .bind(resource.value())
        .bind(resource.is_active())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to insert resource", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit resource", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Resource>, RepositoryError> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM resources WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find resource by id", e))?;

        row.map(Resource::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &ResourceFilter,
        page: PageRequest,
    ) -> Result<Page<Resource>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM resources");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to count resources", e))?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM resources", COLUMNS));
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC, id ASC LIMIT ")
            .push_bind(i64::from(page.size()))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<ResourceRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list resources", e))?;

        let items = rows
            .into_iter()
            .map(Resource::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total.max(0) as u64, page))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &ResourcePatch,
    ) -> Result<Option<Resource>, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM resources WHERE id = $1 FOR UPDATE",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to lock resource", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut resource = Resource::try_from(row)?;
        resource.apply(patch);

        sqlx::query(
            r#"
            UPDATE resources
            SET name = $2, description = $3, value = $4, is_active = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(resource.name().as_str())
        .bind(resource.description())
        .bind(resource.value())
        .bind(resource.is_active())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to update resource", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit resource", e))?;

        Ok(Some(resource))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete resource", e))?;

        Ok(result.rows_affected() > 0)
    }
}
