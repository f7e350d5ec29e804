//! Kernel module - server infrastructure and dependencies.

pub mod record_store;
pub mod test_dependencies;
pub mod traits;

pub use record_store::PgRecordStore;
pub use test_dependencies::MockRecordStore;
pub use traits::*;
