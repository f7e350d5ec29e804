// Business domains
pub mod analytics;
pub mod documents;
pub mod maintenance;
pub mod properties;
pub mod query;
pub mod users;
