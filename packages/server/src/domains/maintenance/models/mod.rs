pub mod aggregates;
pub mod maintenance_issue;

pub use aggregates::*;
pub use maintenance_issue::*;
