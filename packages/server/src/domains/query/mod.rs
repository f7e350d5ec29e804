//! Question answering over the portfolio.
//!
//! A free-text query is lower-cased and scanned against an ordered table of
//! keyword rules; the first rule whose handler produces an answer wins, and a
//! system overview answers everything else.

pub mod answer;
pub mod engine;
pub mod handlers;
pub mod rules;

pub use answer::{AnswerResult, AnswerRow, QueryType};
pub use engine::{QueryEngine, QueryError};
pub use rules::{AliasStrength, IntentRule, MaintenanceTarget, PropertyAlias, RULE_TABLE};
