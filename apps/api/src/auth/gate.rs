// Authorization gate
// Resolves a credential to a live user and enforces active/admin predicates

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::application::errors::ServiceError;
use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::domain::errors::RepositoryError;
use crate::domain::repositories::UserRepository;
use crate::domain::user::User;

pub const INVALID_TOKEN: &str = "Could not validate credentials";
pub const INVALID_LOGIN: &str = "Incorrect username or password";
pub const INACTIVE_ACCOUNT: &str = "Inactive user account";
pub const ADMIN_REQUIRED: &str = "Admin privileges required";

/// Credentials carried by an `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Basic { login: String, password: String },
}

impl Credentials {
    /// Parses `Bearer <token>` or `Basic <base64(login:password)>`
    ///
    /// The scheme name is matched case-insensitively.
    pub fn parse(header: &str) -> Result<Self, ServiceError> {
        let (scheme, value) = header
            .trim()
            .split_once(' ')
            .ok_or_else(|| ServiceError::Unauthorized("Invalid authorization header".into()))?;
        let value = value.trim();

        if scheme.eq_ignore_ascii_case("bearer") && !value.is_empty() {
            return Ok(Self::Bearer(value.to_string()));
        }

        if scheme.eq_ignore_ascii_case("basic") {
            let decoded = STANDARD
                .decode(value)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .ok_or_else(|| ServiceError::Unauthorized("Invalid basic credentials".into()))?;
            let (login, password) = decoded
                .split_once(':')
                .ok_or_else(|| ServiceError::Unauthorized("Invalid basic credentials".into()))?;

            return Ok(Self::Basic {
                login: login.to_string(),
                password: password.to_string(),
            });
        }

        Err(ServiceError::Unauthorized(
            "Unsupported authorization scheme. Use Bearer or Basic".into(),
        ))
    }
}

fn lookup_failed(err: RepositoryError) -> ServiceError {
    tracing::error!(error = %err, "user lookup failed during authentication");
    ServiceError::Internal("An error occurred while authenticating".into())
}

fn ensure_active(user: User) -> Result<User, ServiceError> {
    if user.is_active {
        Ok(user)
    } else {
        Err(ServiceError::Forbidden(INACTIVE_ACCOUNT.into()))
    }
}

/// Bearer scheme: token → subject → user → active check
pub async fn authenticate_bearer(
    users: &dyn UserRepository,
    tokens: &TokenService,
    token: &str,
) -> Result<User, ServiceError> {
    let username = tokens
        .verify(token)
        .ok_or_else(|| ServiceError::Unauthorized(INVALID_TOKEN.into()))?;

    let user = users
        .find_by_username(&username)
        .await
        .map_err(lookup_failed)?
        .ok_or_else(|| ServiceError::Unauthorized(INVALID_TOKEN.into()))?;

    ensure_active(user)
}

/// Basic scheme: username-or-email + password → user → active check
///
/// Login uses the same path before issuing a token.
pub async fn authenticate_basic(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    login: &str,
    password: &str,
) -> Result<User, ServiceError> {
    let verified = match users.find_by_login(login.trim()).await.map_err(lookup_failed)? {
        Some(user) => Some(user).filter(|user| hasher.verify(password, &user.password_hash)),
        None => {
            hasher.verify_absent(password);
            None
        }
    };
    let user = verified.ok_or_else(|| ServiceError::Unauthorized(INVALID_LOGIN.into()))?;

    ensure_active(user)
}

/// Resolves either credential scheme to the same user
pub async fn authenticate(
    users: &dyn UserRepository,
    tokens: &TokenService,
    hasher: &PasswordHasher,
    credentials: &Credentials,
) -> Result<User, ServiceError> {
    match credentials {
        Credentials::Bearer(token) => authenticate_bearer(users, tokens, token).await,
        Credentials::Basic { login, password } => {
            authenticate_basic(users, hasher, login, password).await
        }
    }
}

/// Admin escalation on an already resolved user
pub fn require_admin(user: User) -> Result<User, ServiceError> {
    if user.is_admin {
        Ok(user)
    } else {
        Err(ServiceError::Forbidden(ADMIN_REQUIRED.into()))
    }
}
