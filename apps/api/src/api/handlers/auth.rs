use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{deserialize_some, non_null, JsonBody, PathParams, QueryParams};
use crate::api::middleware::{AdminUser, CurrentUser};
use crate::app::AppState;
use crate::application::users::{self, ProfileUpdate, Registration};
use crate::domain::entity::EntityMeta;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::user::{Email, Password, User, UserFilter, Username};

/// Request body for user registration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for user login
///
/// `username` may also hold the account's email address.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Request body for updating the current user
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMeRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub password: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub is_active: Option<Option<bool>>,
}

/// Admin list query: filters plus pagination
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Public user representation; the password hash never leaves the server
#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            meta: user.meta,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            is_active: user.is_active,
            is_admin: user.is_admin,
        }
    }
}

/// Register a new user
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let registration = Registration {
        username: Username::new(&req.username)?,
        email: Email::new(&req.email)?,
        password: Password::new(req.password)?,
    };

    let user = users::register(state.users.as_ref(), &state.hasher, registration).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Login with username (or email) and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = users::login(
        state.users.as_ref(),
        &state.hasher,
        &state.tokens,
        &req.username,
        &req.password,
    )
    .await?;

    Ok(Json(TokenResponse {
        access_token: token.access_token,
        token_type: token.token_type,
    }))
}

/// Current user's profile
///
/// GET /auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// Update the current user's email, password or active flag
///
/// PATCH /auth/me
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<UpdateMeRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let update = ProfileUpdate {
        email: non_null("email", req.email)?
            .map(Email::new)
            .transpose()?,
        password: non_null("password", req.password)?
            .map(Password::new)
            .transpose()?,
        is_active: non_null("is_active", req.is_active)?,
    };

    let updated =
        users::update_profile(state.users.as_ref(), &state.hasher, &user, update).await?;

    Ok(Json(UserResponse::from(&updated)))
}

/// List users (admin only)
///
/// GET /auth/users
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    QueryParams(query): QueryParams<ListUsersQuery>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let page = PageRequest::new(query.page, query.size)?;
    let filter = UserFilter {
        username: query.username,
        email: query.email,
        is_active: query.is_active,
    };

    let listed = users::list_users(state.users.as_ref(), &admin, &filter, page).await?;

    Ok(Json(listed.map(|user| UserResponse::from(&user))))
}

/// Delete a user (admin only, never oneself)
///
/// DELETE /auth/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParams(id): PathParams<Uuid>,
) -> Result<StatusCode, ApiError> {
    users::delete_user(state.users.as_ref(), &admin, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
