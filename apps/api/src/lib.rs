//! Keystone API Library
//!
//! Authenticated CRUD service: user accounts with bearer and basic
//! authentication, admin user management, and an example resource served
//! through a generic CRUD pipeline.

pub mod api;
pub mod app;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
