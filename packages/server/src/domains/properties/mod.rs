pub mod models;

pub use models::{NewProperty, Property, PropertyFilter};
