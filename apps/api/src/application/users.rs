// User account use cases
// Registration, login, self-service updates and admin management

use tracing::info;
use uuid::Uuid;

use super::crud;
use super::errors::ServiceError;
use crate::auth::gate;
use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::domain::entity::Entity;
use crate::domain::errors::RepositoryError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::UserRepository;
use crate::domain::user::{Email, NewUser, Password, User, UserFilter, UserPatch, Username};

/// Validated registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub email: Email,
    pub password: Password,
}

/// Validated self-service update; absent fields stay unchanged
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<Email>,
    pub password: Option<Password>,
    pub is_active: Option<bool>,
}

/// Issued bearer credential
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

fn storage_failure(err: RepositoryError) -> ServiceError {
    tracing::error!(error = %err, "user lookup failed");
    ServiceError::Internal("An error occurred while accessing user records".into())
}

fn hash(hasher: &PasswordHasher, password: &Password) -> Result<String, ServiceError> {
    hasher.hash(password.expose()).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ServiceError::Internal("An error occurred while hashing the password".into())
    })
}

/// Registers a new, active, non-admin account
///
/// Username and email are checked up front so the caller gets a precise
/// message; the store's unique indexes still guard concurrent registrations.
pub async fn register(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    registration: Registration,
) -> Result<User, ServiceError> {
    create_account(users, hasher, registration, false).await
}

async fn create_account(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    registration: Registration,
    is_admin: bool,
) -> Result<User, ServiceError> {
    if users
        .find_by_username(registration.username.as_str())
        .await
        .map_err(storage_failure)?
        .is_some()
    {
        return Err(ServiceError::Conflict("Username already exists".into()));
    }

    if users
        .find_by_email(registration.email.as_str())
        .await
        .map_err(storage_failure)?
        .is_some()
    {
        return Err(ServiceError::Conflict("Email already registered".into()));
    }

    let draft = NewUser {
        username: registration.username,
        email: registration.email,
        password_hash: hash(hasher, &registration.password)?,
        is_admin,
    };

    crud::create::<User, _>(users, draft).await.map_err(|e| match e {
        ServiceError::Conflict(_) => {
            ServiceError::Conflict("Username or email already exists".into())
        }
        other => other,
    })
}

/// Checks username-or-email and password, then issues a bearer token
pub async fn login(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    tokens: &TokenService,
    login: &str,
    password: &str,
) -> Result<AccessToken, ServiceError> {
    let user = gate::authenticate_basic(users, hasher, login, password).await?;

    let access_token = tokens.issue_default(user.username.as_str()).map_err(|e| {
        tracing::error!(error = %e, "token signing failed");
        ServiceError::Internal("An error occurred while creating the access token".into())
    })?;

    info!(user_id = %user.id(), "user logged in");
    Ok(AccessToken {
        access_token,
        token_type: "bearer",
    })
}

/// Applies a self-service update to the authenticated user
pub async fn update_profile(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    current: &User,
    update: ProfileUpdate,
) -> Result<User, ServiceError> {
    let password_hash = update
        .password
        .as_ref()
        .map(|password| hash(hasher, password))
        .transpose()?;

    let patch = UserPatch {
        email: update.email,
        password_hash,
        is_active: update.is_active,
    };

    crud::update::<User, _>(users, current.id(), &patch)
        .await
        .map_err(|e| match e {
            ServiceError::Conflict(_) => ServiceError::Conflict("Email already in use".into()),
            other => other,
        })
}

/// Lists accounts for an administrator
pub async fn list_users(
    users: &dyn UserRepository,
    admin: &User,
    filter: &UserFilter,
    page: PageRequest,
) -> Result<Page<User>, ServiceError> {
    tracing::debug!(admin_id = %admin.id(), "listing users");
    crud::read_many::<User, _>(users, filter, page).await
}

/// Deletes another user's account; administrators cannot delete themselves
pub async fn delete_user(
    users: &dyn UserRepository,
    admin: &User,
    target: Uuid,
) -> Result<(), ServiceError> {
    if target == admin.id() {
        return Err(ServiceError::Forbidden("Cannot delete your own account".into()));
    }

    crud::delete::<User, _>(users, target).await?;
    info!(admin_id = %admin.id(), user_id = %target, "user deleted by admin");
    Ok(())
}

/// Creates the configured administrator unless the username is taken
///
/// Returns `true` when a new account was created.
pub async fn ensure_admin(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    registration: Registration,
) -> Result<bool, ServiceError> {
    if users
        .find_by_username(registration.username.as_str())
        .await
        .map_err(storage_failure)?
        .is_some()
    {
        return Ok(false);
    }

    let admin = create_account(users, hasher, registration, true).await?;
    info!(user_id = %admin.id(), username = %admin.username, "bootstrap admin created");
    Ok(true)
}
