// TestDependencies - mock implementations for testing
//
// Provides an in-memory record store that can stand in for PgRecordStore in
// unit tests, router tests and the query engine tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::BaseRecordStore;
use crate::bootstrap::{sample_issues, sample_properties};
use crate::common::SortOrder;
use crate::domains::maintenance::{
    IssueStatus, MaintenanceFilter, MaintenanceIssue, MaintenanceIssueWithAddress,
    PropertyCostSummary, RecurringIssue,
};
use crate::domains::properties::{Property, PropertyFilter};

// =============================================================================
// Fixtures
// =============================================================================

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A property with only id and address set
pub fn test_property(id: &str, address: &str) -> Property {
    Property {
        id: id.to_string(),
        address: address.to_string(),
        property_type: None,
        tenant_name: None,
        lease_type: None,
        rent_amount: None,
        lease_start_date: None,
        lease_end_date: None,
        landlord_name: None,
        tax_id: None,
        created_at: fixture_timestamp(),
    }
}

/// A resolved issue with zero cost; override fields with struct update syntax
pub fn test_issue(id: i64, property_id: &str, category: &str, date: NaiveDate) -> MaintenanceIssue {
    MaintenanceIssue {
        id,
        property_id: property_id.to_string(),
        category: category.to_string(),
        description: format!("{} repair", category),
        date,
        status: IssueStatus::Resolved.as_str().to_string(),
        cost: Decimal::ZERO,
        vendor: "Test Vendor".to_string(),
        created_at: fixture_timestamp(),
    }
}

// =============================================================================
// Mock Record Store
// =============================================================================

#[derive(Clone, Default)]
pub struct MockRecordStore {
    properties: Vec<Property>,
    issues: Vec<MaintenanceIssue>,
    fail_with: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the same portfolio the bootstrap seeds
    pub fn from_sample_data() -> Self {
        let created_at = fixture_timestamp();
        let mut store = Self::new();
        for property in sample_properties() {
            store = store.with_property(property.into_property(created_at));
        }
        for (index, issue) in sample_issues().into_iter().enumerate() {
            store = store.with_issue(issue.into_issue(index as i64 + 1, created_at));
        }
        store
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_issue(mut self, issue: MaintenanceIssue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Every call fails as if the database were unreachable
    pub fn failing(mut self) -> Self {
        self.fail_with = Some("connection refused".to_string());
        self
    }

    /// Names of the store operations called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, call: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call.to_string());
        match &self.fail_with {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(()),
        }
    }

    fn filtered_issues(&self, filter: &MaintenanceFilter, order: SortOrder) -> Vec<MaintenanceIssue> {
        let mut issues: Vec<MaintenanceIssue> = self
            .issues
            .iter()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect();
        issues.sort_by_key(|issue| (issue.date, issue.id));
        if order == SortOrder::Descending {
            issues.reverse();
        }
        issues
    }

    fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.id == id)
    }
}

#[async_trait]
impl BaseRecordStore for MockRecordStore {
    async fn list_maintenance_issues(
        &self,
        filter: &MaintenanceFilter,
        order: SortOrder,
    ) -> Result<Vec<MaintenanceIssue>> {
        self.record("list_maintenance_issues")?;
        Ok(self.filtered_issues(filter, order))
    }

    async fn list_maintenance_issues_with_address(
        &self,
        filter: &MaintenanceFilter,
        order: SortOrder,
    ) -> Result<Vec<MaintenanceIssueWithAddress>> {
        self.record("list_maintenance_issues_with_address")?;
        Ok(self
            .filtered_issues(filter, order)
            .into_iter()
            .filter_map(|issue| {
                let address = self.property(&issue.property_id)?.address.clone();
                Some(MaintenanceIssueWithAddress { issue, address })
            })
            .collect())
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>> {
        self.record("list_properties")?;
        let mut properties: Vec<Property> = self
            .properties
            .iter()
            .filter(|property| {
                filter
                    .lease_type
                    .as_deref()
                    .map_or(true, |lease_type| property.lease_type.as_deref() == Some(lease_type))
            })
            .filter(|property| {
                filter.lease_end_range.map_or(true, |range| {
                    property.lease_end_date.is_some_and(|end| range.contains(end))
                })
            })
            .cloned()
            .collect();
        properties.sort_by(|a, b| {
            (a.lease_end_date.is_none(), a.lease_end_date, &a.id)
                .cmp(&(b.lease_end_date.is_none(), b.lease_end_date, &b.id))
        });
        Ok(properties)
    }

    async fn find_property(&self, id: &str) -> Result<Option<Property>> {
        self.record("find_property")?;
        Ok(self.property(id).cloned())
    }

    async fn aggregate_maintenance_cost_by_property(&self) -> Result<Vec<PropertyCostSummary>> {
        self.record("aggregate_maintenance_cost_by_property")?;
        let mut by_address: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
        for issue in &self.issues {
            let Some(property) = self.property(&issue.property_id) else {
                continue;
            };
            let entry = by_address
                .entry(property.address.clone())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += issue.cost;
            entry.1 += 1;
        }
        Ok(by_address
            .into_iter()
            .map(|(address, (total_cost, issue_count))| PropertyCostSummary {
                address,
                total_cost,
                issue_count,
            })
            .collect())
    }

    async fn aggregate_recurring_issues(&self, min_occurrences: i64) -> Result<Vec<RecurringIssue>> {
        self.record("aggregate_recurring_issues")?;
        let mut groups: BTreeMap<(String, String), Vec<&MaintenanceIssue>> = BTreeMap::new();
        for issue in &self.issues {
            groups
                .entry((issue.property_id.clone(), issue.category.clone()))
                .or_default()
                .push(issue);
        }

        let mut recurring: Vec<RecurringIssue> = groups
            .into_iter()
            .filter(|(_, issues)| issues.len() as i64 >= min_occurrences)
            .map(|((property_id, category), mut issues)| {
                issues.sort_by_key(|issue| (issue.date, issue.id));
                RecurringIssue {
                    property_id,
                    category,
                    occurrence_count: issues.len() as i64,
                    dates: issues
                        .iter()
                        .map(|issue| issue.date.to_string())
                        .collect::<Vec<_>>()
                        .join(","),
                    total_cost: issues.iter().map(|issue| issue.cost).sum(),
                }
            })
            .collect();
        // BTreeMap iteration already orders ties by (property_id, category)
        recurring.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));
        Ok(recurring)
    }

    async fn count_properties(&self) -> Result<i64> {
        self.record("count_properties")?;
        Ok(self.properties.len() as i64)
    }

    async fn sum_rent_amount(&self) -> Result<Option<Decimal>> {
        self.record("sum_rent_amount")?;
        Ok(self
            .properties
            .iter()
            .filter_map(|property| property.rent_amount)
            .reduce(|total, rent| total + rent))
    }

    async fn count_issues_by_status(&self, status: IssueStatus) -> Result<i64> {
        self.record("count_issues_by_status")?;
        Ok(self
            .issues
            .iter()
            .filter(|issue| issue.status == status.as_str())
            .count() as i64)
    }
}
