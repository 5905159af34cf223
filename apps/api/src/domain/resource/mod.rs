// Resource domain module
// The example entity served by the generic CRUD pipeline

#![allow(clippy::module_inception)]

pub mod resource;
pub mod value_objects;

pub use resource::{NewResource, Resource, ResourceFilter, ResourcePatch};
pub use value_objects::ResourceName;
