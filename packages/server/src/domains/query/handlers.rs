// Intent handlers
//
// One read-only aggregation per intent. Only maintenance history may decline
// to answer (`Ok(None)`), which sends the classifier on to the next rule.

use chrono::{Days, NaiveDate};

use super::answer::{AnswerResult, QueryType};
use super::engine::QueryError;
use super::rules::MaintenanceTarget;
use crate::common::{DateRange, SortOrder};
use crate::domains::maintenance::{IssueStatus, MaintenanceFilter};
use crate::domains::properties::PropertyFilter;
use crate::kernel::BaseRecordStore;

pub const HEATING_CATEGORY: &str = "heating";
pub const HEATING_COMPLAINT_YEAR: i32 = 2023;
pub const LEASE_EXPIRY_WINDOW_DAYS: u64 = 180;
pub const TRIPLE_NET_LEASE: &str = "Triple Net";
pub const RECURRING_MIN_OCCURRENCES: i64 = 2;

/// Run the handler for a matched rule.
pub async fn handle(
    query_type: QueryType,
    query: &str,
    store: &dyn BaseRecordStore,
    today: NaiveDate,
) -> Result<Option<AnswerResult>, QueryError> {
    let answer = match query_type {
        QueryType::MaintenanceHistory => return maintenance_history(store, query).await,
        QueryType::FilteredMaintenance => heating_complaints(store).await?,
        QueryType::ExpiringLeases => expiring_leases(store, today).await?,
        QueryType::FinancialSummary => financial_summary(store).await?,
        QueryType::LeaseTypeInfo => triple_net_properties(store).await?,
        QueryType::RecurringIssues => recurring_issues(store).await?,
        QueryType::SystemOverview => system_overview(store).await?,
    };
    Ok(Some(answer))
}

/// Most recent repair of the named category at the named property.
pub async fn maintenance_history(
    store: &dyn BaseRecordStore,
    query: &str,
) -> Result<Option<AnswerResult>, QueryError> {
    let Some(target) = MaintenanceTarget::resolve(query) else {
        return Ok(None);
    };

    let filter = MaintenanceFilter {
        property_id: Some(target.property_id.to_string()),
        category: Some(target.category.to_string()),
        date_range: None,
    };
    let issues = store
        .list_maintenance_issues(&filter, SortOrder::Descending)
        .await?;
    if issues.is_empty() {
        return Ok(None);
    }

    let address = store
        .find_property(target.property_id)
        .await?
        .map(|property| property.address)
        .unwrap_or_else(|| target.property_id.to_string());

    Ok(AnswerResult::maintenance_history(
        target.category,
        &address,
        issues,
    ))
}

pub async fn heating_complaints(store: &dyn BaseRecordStore) -> Result<AnswerResult, QueryError> {
    let filter = MaintenanceFilter {
        property_id: None,
        category: Some(HEATING_CATEGORY.to_string()),
        date_range: DateRange::year(HEATING_COMPLAINT_YEAR),
    };
    let issues = store
        .list_maintenance_issues_with_address(&filter, SortOrder::Ascending)
        .await?;
    Ok(AnswerResult::filtered_maintenance(
        HEATING_CATEGORY,
        HEATING_COMPLAINT_YEAR,
        issues,
    ))
}

/// Leases ending between today and 180 days out, both inclusive.
pub async fn expiring_leases(
    store: &dyn BaseRecordStore,
    today: NaiveDate,
) -> Result<AnswerResult, QueryError> {
    let window_end = today
        .checked_add_days(Days::new(LEASE_EXPIRY_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);
    let filter = PropertyFilter {
        lease_type: None,
        lease_end_range: Some(DateRange::new(today, window_end)),
    };
    let properties = store.list_properties(&filter).await?;
    Ok(AnswerResult::expiring_leases(properties))
}

pub async fn financial_summary(store: &dyn BaseRecordStore) -> Result<AnswerResult, QueryError> {
    let costs = store.aggregate_maintenance_cost_by_property().await?;
    Ok(AnswerResult::financial_summary(costs))
}

pub async fn triple_net_properties(
    store: &dyn BaseRecordStore,
) -> Result<AnswerResult, QueryError> {
    let filter = PropertyFilter {
        lease_type: Some(TRIPLE_NET_LEASE.to_string()),
        lease_end_range: None,
    };
    let properties = store.list_properties(&filter).await?;
    Ok(AnswerResult::lease_type_info(TRIPLE_NET_LEASE, properties))
}

pub async fn recurring_issues(store: &dyn BaseRecordStore) -> Result<AnswerResult, QueryError> {
    let groups = store
        .aggregate_recurring_issues(RECURRING_MIN_OCCURRENCES)
        .await?;
    Ok(AnswerResult::recurring_issues(groups))
}

/// Fallback answer; never empty.
pub async fn system_overview(store: &dyn BaseRecordStore) -> Result<AnswerResult, QueryError> {
    let property_count = store.count_properties().await?;
    let total_rent = store.sum_rent_amount().await?;
    let active_issues = store.count_issues_by_status(IssueStatus::InProgress).await?;
    Ok(AnswerResult::system_overview(
        property_count,
        total_rent,
        active_issues,
    ))
}
