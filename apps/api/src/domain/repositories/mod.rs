// Repository interfaces (ports)
// Infrastructure adapters implement these traits

pub mod crud_repository;
pub mod user_repository;

pub use crud_repository::CrudRepository;
pub use user_repository::UserRepository;
