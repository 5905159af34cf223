use axum::{extract::State, http::StatusCode, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{deserialize_some, non_null, JsonBody, PathParams, QueryParams};
use crate::app::AppState;
use crate::application::crud;
use crate::domain::entity::{Entity, EntityMeta};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::resource::{NewResource, Resource, ResourceFilter, ResourcePatch};

/// Request body for creating a resource
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateResourceRequest {
    pub name: String,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Request body for a partial update; absent fields are left alone
///
/// `description` and `value` may be set to `null` to clear them.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateResourceRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub value: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub is_active: Option<Option<bool>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListResourcesQuery {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub is_active: bool,
}

impl From<&Resource> for ResourceResponse {
    fn from(resource: &Resource) -> Self {
        Self {
            meta: *resource.meta(),
            name: resource.name().as_str().to_string(),
            description: resource.description().map(str::to_string),
            value: resource.value(),
            is_active: resource.is_active(),
        }
    }
}

/// Create a resource
///
/// POST /examples
pub async fn create_resource(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceResponse>), ApiError> {
    let draft = NewResource::new(req.name, req.description, req.value, req.is_active)?;

    let resource = crud::create::<Resource, _>(state.resources.as_ref(), draft).await?;

    Ok((StatusCode::CREATED, Json(ResourceResponse::from(&resource))))
}

/// List resources, newest first
///
/// GET /examples
pub async fn list_resources(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListResourcesQuery>,
) -> Result<Json<Page<ResourceResponse>>, ApiError> {
    let page = PageRequest::new(query.page, query.size)?;
    let filter = ResourceFilter {
        name: query.name,
        is_active: query.is_active,
    };

    let listed = crud::read_many::<Resource, _>(state.resources.as_ref(), &filter, page).await?;

    Ok(Json(listed.map(|resource| ResourceResponse::from(&resource))))
}

/// Get a resource by ID
///
/// GET /examples/:id
pub async fn get_resource(
    State(state): State<AppState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<ResourceResponse>, ApiError> {
    let resource = crud::read_one::<Resource, _>(state.resources.as_ref(), id).await?;

    Ok(Json(ResourceResponse::from(&resource)))
}

/// Partially update a resource
///
/// PATCH /examples/:id
pub async fn update_resource(
    State(state): State<AppState>,
    PathParams(id): PathParams<Uuid>,
    JsonBody(req): JsonBody<UpdateResourceRequest>,
) -> Result<Json<ResourceResponse>, ApiError> {
    let patch = ResourcePatch::new(
        non_null("name", req.name)?,
        req.description,
        req.value,
        non_null("is_active", req.is_active)?,
    )?;

    let resource = crud::update::<Resource, _>(state.resources.as_ref(), id, &patch).await?;

    Ok(Json(ResourceResponse::from(&resource)))
}

/// Delete a resource
///
/// DELETE /examples/:id
pub async fn delete_resource(
    State(state): State<AppState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<StatusCode, ApiError> {
    crud::delete::<Resource, _>(state.resources.as_ref(), id).await?;

    Ok(StatusCode::NO_CONTENT)
}
