use async_trait::async_trait;

use super::crud_repository::CrudRepository;
use crate::domain::errors::RepositoryError;
use crate::domain::user::User;

/// Repository trait for User aggregate
///
/// Lookups compare usernames and emails case-insensitively.
#[async_trait]
pub trait UserRepository: CrudRepository<User> {
    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Find a user by email address
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Find a user whose username or email equals `login`
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError>;
}
