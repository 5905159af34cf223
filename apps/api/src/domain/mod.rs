// Domain layer module exports
// Domain is independent of infrastructure concerns

pub mod entity;
pub mod errors;
pub mod pagination;
pub mod repositories;
pub mod resource;
pub mod user;
