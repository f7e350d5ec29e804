// Real Estate Asset Brain - API Core
//
// Property-management backend: CRUD over properties, maintenance issues,
// documents and users, plus the "ask a question" engine that classifies a
// free-text query into a fixed intent and answers it from the record store.

pub mod bootstrap;
pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
