// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Intent classification and answer formatting live in domains::query and use
// these traits to read data.
//
// Naming convention: Base* for trait names (e.g., BaseRecordStore)

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::common::SortOrder;
use crate::domains::maintenance::{
    IssueStatus, MaintenanceFilter, MaintenanceIssue, MaintenanceIssueWithAddress,
    PropertyCostSummary, RecurringIssue,
};
use crate::domains::properties::{Property, PropertyFilter};

// =============================================================================
// Record Store Trait (Infrastructure - read access to portfolio records)
// =============================================================================

/// Read-only view of properties and maintenance issues used by the query engine.
///
/// Implementations must be safe for concurrent readers. Errors are
/// infrastructure failures (connection, I/O); an empty result is `Ok(vec![])`.
#[async_trait]
pub trait BaseRecordStore: Send + Sync {
    /// Issues matching the filter, ordered by date then id in `order`
    async fn list_maintenance_issues(
        &self,
        filter: &MaintenanceFilter,
        order: SortOrder,
    ) -> Result<Vec<MaintenanceIssue>>;

    /// Like `list_maintenance_issues`, joined with the property address.
    /// Issues whose property does not exist are left out.
    async fn list_maintenance_issues_with_address(
        &self,
        filter: &MaintenanceFilter,
        order: SortOrder,
    ) -> Result<Vec<MaintenanceIssueWithAddress>>;

    /// Properties matching the filter, ascending by lease end date (missing dates last), then id
    async fn list_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>>;

    async fn find_property(&self, id: &str) -> Result<Option<Property>>;

    /// Total cost and issue count per property address, ordered by address
    async fn aggregate_maintenance_cost_by_property(&self) -> Result<Vec<PropertyCostSummary>>;

    /// (property, category) groups with at least `min_occurrences` issues,
    /// descending by occurrence count, then property id and category
    async fn aggregate_recurring_issues(&self, min_occurrences: i64) -> Result<Vec<RecurringIssue>>;

    async fn count_properties(&self) -> Result<i64>;

    /// `None` when no property has a rent amount
    async fn sum_rent_amount(&self) -> Result<Option<Decimal>>;

    async fn count_issues_by_status(&self, status: IssueStatus) -> Result<i64>;
}
