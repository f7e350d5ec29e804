pub mod models;

pub use models::{hash_password, User, UserRole};
