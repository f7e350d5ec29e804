// HTTP routes
pub mod analytics;
pub mod auth;
pub mod documents;
pub mod health;
pub mod maintenance;
pub mod properties;
pub mod query;

pub use analytics::*;
pub use auth::*;
pub use documents::*;
pub use health::*;
pub use maintenance::*;
pub use properties::*;
pub use query::*;
