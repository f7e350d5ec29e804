// Common types and utilities shared across the application

pub mod money;
pub mod types;

pub use money::format_currency;
pub use types::*;
