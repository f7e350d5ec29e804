pub mod models;

pub use models::{CategoryBreakdown, PortfolioAnalytics};
