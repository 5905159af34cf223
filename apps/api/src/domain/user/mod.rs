// User domain module
// Account aggregate and its credential value objects

#![allow(clippy::module_inception)]

pub mod user;
pub mod value_objects;

pub use user::{NewUser, User, UserFilter, UserPatch};
pub use value_objects::{Email, Password, Username};
