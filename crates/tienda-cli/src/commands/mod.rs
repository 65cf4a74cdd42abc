//! Subcommand implementations.

pub mod auth;
pub mod dashboard;
pub mod resource;
