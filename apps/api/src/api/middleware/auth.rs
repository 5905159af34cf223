use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::errors::ApiError;
use crate::app::AppState;
use crate::auth::gate::{self, Credentials};
use crate::domain::user::User;

/// Authenticated, active user for protected routes
///
/// Accepts `Authorization: Bearer <token>` or `Authorization: Basic ...`.
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(CurrentUser(user): CurrentUser) -> String {
///     format!("Hello {}", user.username)
/// }
/// ```
pub struct CurrentUser(pub User);

/// Authenticated, active administrator
pub struct AdminUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let credentials = Credentials::parse(header)?;

        let state = AppState::from_ref(state);
        let user = gate::authenticate(
            state.users.as_ref(),
            &state.tokens,
            &state.hasher,
            &credentials,
        )
        .await?;

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(AdminUser(gate::require_admin(user)?))
    }
}
