pub mod portfolio_analytics;

pub use portfolio_analytics::*;
