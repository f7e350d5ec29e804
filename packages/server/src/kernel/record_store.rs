// PostgreSQL-backed record store
//
// Thin adapter from BaseRecordStore onto the domain model queries.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::BaseRecordStore;
use crate::common::SortOrder;
use crate::domains::maintenance::{
    IssueStatus, MaintenanceFilter, MaintenanceIssue, MaintenanceIssueWithAddress,
    PropertyCostSummary, RecurringIssue,
};
use crate::domains::properties::{Property, PropertyFilter};

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseRecordStore for PgRecordStore {
    async fn list_maintenance_issues(
        &self,
        filter: &MaintenanceFilter,
        order: SortOrder,
    ) -> Result<Vec<MaintenanceIssue>> {
        MaintenanceIssue::find_filtered(filter, order, &self.pool).await
    }

    async fn list_maintenance_issues_with_address(
        &self,
        filter: &MaintenanceFilter,
        order: SortOrder,
    ) -> Result<Vec<MaintenanceIssueWithAddress>> {
        MaintenanceIssue::find_filtered_with_address(filter, order, &self.pool).await
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>> {
        Property::find_filtered(filter, &self.pool).await
    }

    async fn find_property(&self, id: &str) -> Result<Option<Property>> {
        Property::find_by_id(id, &self.pool).await
    }

    async fn aggregate_maintenance_cost_by_property(&self) -> Result<Vec<PropertyCostSummary>> {
        PropertyCostSummary::by_property(&self.pool).await
    }

    async fn aggregate_recurring_issues(&self, min_occurrences: i64) -> Result<Vec<RecurringIssue>> {
        RecurringIssue::find_all(min_occurrences, &self.pool).await
    }

    async fn count_properties(&self) -> Result<i64> {
        Property::count(&self.pool).await
    }

    async fn sum_rent_amount(&self) -> Result<Option<Decimal>> {
        Property::sum_rent_amount(&self.pool).await
    }

    async fn count_issues_by_status(&self, status: IssueStatus) -> Result<i64> {
        MaintenanceIssue::count_by_status(status, &self.pool).await
    }
}
