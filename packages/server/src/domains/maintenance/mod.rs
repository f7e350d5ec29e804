pub mod models;

pub use models::{
    IssueStatus, MaintenanceFilter, MaintenanceIssue, MaintenanceIssueWithAddress,
    NewMaintenanceIssue, PropertyCostSummary, RecurringIssue,
};
