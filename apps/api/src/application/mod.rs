// Application layer
// Use cases orchestrating domain objects and repository ports

pub mod crud;
pub mod errors;
pub mod users;
