// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory;
pub mod postgres_resource_repository;
pub mod postgres_user_repository;

pub use in_memory::InMemoryRepository;
pub use postgres_resource_repository::PostgresResourceRepository;
pub use postgres_user_repository::PostgresUserRepository;
