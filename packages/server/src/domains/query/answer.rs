use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::format_currency;
use crate::domains::maintenance::{
    MaintenanceIssue, MaintenanceIssueWithAddress, PropertyCostSummary, RecurringIssue,
};
use crate::domains::properties::Property;

/// Which rule produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    MaintenanceHistory,
    FilteredMaintenance,
    ExpiringLeases,
    FinancialSummary,
    LeaseTypeInfo,
    RecurringIssues,
    SystemOverview,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::MaintenanceHistory => "maintenance_history",
            QueryType::FilteredMaintenance => "filtered_maintenance",
            QueryType::ExpiringLeases => "expiring_leases",
            QueryType::FinancialSummary => "financial_summary",
            QueryType::LeaseTypeInfo => "lease_type_info",
            QueryType::RecurringIssues => "recurring_issues",
            QueryType::SystemOverview => "system_overview",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One supporting row. Serialized without a tag, so each row keeps the
/// column names of the record it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerRow {
    MaintenanceIssue(MaintenanceIssue),
    MaintenanceIssueWithAddress(MaintenanceIssueWithAddress),
    Property(Property),
    PropertyCost(PropertyCostSummary),
    RecurringIssue(RecurringIssue),
}

/// A one-sentence answer, the rows behind it, and the rule that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    answer: String,
    data: Vec<AnswerRow>,
    query_type: QueryType,
}

impl AnswerResult {
    fn new(query_type: QueryType, answer: String, data: Vec<AnswerRow>) -> Self {
        Self {
            answer,
            data,
            query_type,
        }
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn data(&self) -> &[AnswerRow] {
        &self.data
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Latest repair of one category at one property. `issues` must be newest
    /// first; `None` when there are none.
    pub fn maintenance_history(
        category: &str,
        address: &str,
        issues: Vec<MaintenanceIssue>,
    ) -> Option<Self> {
        let latest = issues.first()?;
        let answer = format!(
            "The {} at {} was last repaired on {} by {} ({}). Issue: {}",
            category,
            address,
            latest.date,
            latest.vendor,
            format_currency(latest.cost),
            latest.description
        );
        Some(Self::new(
            QueryType::MaintenanceHistory,
            answer,
            issues.into_iter().map(AnswerRow::MaintenanceIssue).collect(),
        ))
    }

    pub fn filtered_maintenance(
        category: &str,
        year: i32,
        issues: Vec<MaintenanceIssueWithAddress>,
    ) -> Self {
        Self::new(
            QueryType::FilteredMaintenance,
            format!(
                "Found {} {} complaint(s) in {}.",
                issues.len(),
                category,
                year
            ),
            issues
                .into_iter()
                .map(AnswerRow::MaintenanceIssueWithAddress)
                .collect(),
        )
    }

    pub fn expiring_leases(properties: Vec<Property>) -> Self {
        Self::new(
            QueryType::ExpiringLeases,
            format!(
                "Found {} lease(s) expiring in the next 6 months.",
                properties.len()
            ),
            properties.into_iter().map(AnswerRow::Property).collect(),
        )
    }

    pub fn financial_summary(costs: Vec<PropertyCostSummary>) -> Self {
        let total: Decimal = costs.iter().map(|row| row.total_cost).sum();
        Self::new(
            QueryType::FinancialSummary,
            format!(
                "Total maintenance costs across all properties: {}",
                format_currency(total)
            ),
            costs.into_iter().map(AnswerRow::PropertyCost).collect(),
        )
    }

    pub fn lease_type_info(lease_type: &str, properties: Vec<Property>) -> Self {
        Self::new(
            QueryType::LeaseTypeInfo,
            format!("Found {} {} Lease properties.", properties.len(), lease_type),
            properties.into_iter().map(AnswerRow::Property).collect(),
        )
    }

    pub fn recurring_issues(groups: Vec<RecurringIssue>) -> Self {
        Self::new(
            QueryType::RecurringIssues,
            format!(
                "Found {} recurring maintenance issues across properties.",
                groups.len()
            ),
            groups.into_iter().map(AnswerRow::RecurringIssue).collect(),
        )
    }

    /// Portfolio headline figures. A missing rent total counts as zero.
    pub fn system_overview(
        property_count: i64,
        total_rent: Option<Decimal>,
        active_issues: i64,
    ) -> Self {
        Self::new(
            QueryType::SystemOverview,
            format!(
                "System Overview: {} properties, {} total monthly rent, {} active maintenance issues.",
                property_count,
                format_currency(total_rent.unwrap_or_default()),
                active_issues
            ),
            Vec::new(),
        )
    }
}
