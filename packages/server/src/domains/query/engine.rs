use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::answer::AnswerResult;
use super::handlers;
use super::rules::{matching_rules, normalize_query};
use crate::kernel::BaseRecordStore;

/// Failures while answering a query. An empty result is never an error.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("record store unavailable: {0}")]
    StoreUnavailable(#[from] anyhow::Error),
}

/// Classifies free-text questions and answers them from the record store.
///
/// Holds no mutable state; clones share the store and may run concurrently.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn BaseRecordStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn BaseRecordStore>) -> Self {
        Self { store }
    }

    /// Answer `text` as of today's UTC date.
    pub async fn answer_query(&self, text: &str) -> Result<AnswerResult, QueryError> {
        self.answer_query_on(text, Utc::now().date_naive()).await
    }

    /// Answer `text` with lease windows measured from `today`.
    pub async fn answer_query_on(
        &self,
        text: &str,
        today: NaiveDate,
    ) -> Result<AnswerResult, QueryError> {
        let query = normalize_query(text);

        for rule in matching_rules(&query) {
            match handlers::handle(rule.query_type, &query, self.store.as_ref(), today).await? {
                Some(answer) => {
                    info!(query_type = %answer.query_type(), rows = answer.data().len(), "Answered query");
                    return Ok(answer);
                }
                None => {
                    debug!(query_type = %rule.query_type, "Rule matched without results, continuing");
                }
            }
        }

        let answer = handlers::system_overview(self.store.as_ref()).await?;
        info!(query_type = %answer.query_type(), "Answered query with system overview");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::maintenance::MaintenanceIssue;
    use crate::domains::properties::Property;
    use crate::domains::query::{AnswerRow, QueryType};
    use crate::kernel::test_dependencies::{test_issue, test_property, MockRecordStore};
    use rust_decimal::Decimal;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_engine() -> QueryEngine {
        QueryEngine::new(Arc::new(MockRecordStore::from_sample_data()))
    }

    fn property_ids(result: &AnswerResult) -> Vec<String> {
        result
            .data()
            .iter()
            .map(|row| match row {
                AnswerRow::Property(property) => property.id.clone(),
                other => panic!("expected property row, got {:?}", other),
            })
            .collect()
    }

    fn issue_dates(result: &AnswerResult) -> Vec<NaiveDate> {
        result
            .data()
            .iter()
            .map(|row| match row {
                AnswerRow::MaintenanceIssue(issue) => issue.date,
                AnswerRow::MaintenanceIssueWithAddress(row) => row.issue.date,
                other => panic!("expected maintenance row, got {:?}", other),
            })
            .collect()
    }

    #[tokio::test]
    async fn roof_at_elm_reports_latest_repair() {
        let result = sample_engine()
            .answer_query_on("When was the roof at 12 Elm Street last fixed?", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::MaintenanceHistory);
        assert_eq!(
            result.answer(),
            "The roof at 12 Elm Street was last repaired on 2023-03-15 by ABC Roofing ($3,200.00). Issue: Water infiltration northeast corner"
        );
        assert_eq!(issue_dates(&result), vec![date("2023-03-15")]);
    }

    #[tokio::test]
    async fn maintenance_history_is_newest_first() {
        let result = sample_engine()
            .answer_query_on("plumbing at elm", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::MaintenanceHistory);
        assert_eq!(
            issue_dates(&result),
            vec![date("2024-08-15"), date("2024-02-10")]
        );
        assert!(result.answer().contains("on 2024-08-15 by Quick Plumbers ($350.00)"));
    }

    #[tokio::test]
    async fn maintenance_history_for_indian_property() {
        let result = sample_engine()
            .answer_query_on("Plumbing issues at Galaxy Heights?", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::MaintenanceHistory);
        assert_eq!(
            result.answer(),
            "The plumbing at 101, Galaxy Heights, Bandra West, Mumbai was last repaired on 2024-07-15 by QuickFix Utilities ($4,500.00). Issue: Monsoon leakage in master bedroom wall"
        );
    }

    #[tokio::test]
    async fn villa_number_does_not_route_to_elm_street() {
        let result = sample_engine()
            .answer_query_on("When was the gardening at Villa 12, Delhi last done?", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::MaintenanceHistory);
        assert_eq!(
            result.answer(),
            "The gardening at Villa 12, Green Park, South Delhi was last repaired on 2024-09-05 by Green Thumbs ($2,500.00). Issue: Seasonal lawn maintenance and pruning"
        );
    }

    #[tokio::test]
    async fn villa_without_category_history_does_not_borrow_elm_history() {
        let store = MockRecordStore::from_sample_data();
        let engine = QueryEngine::new(Arc::new(store.clone()));

        let result = engine
            .answer_query_on("plumbing at delhi villa 12", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::SystemOverview);
        assert!(!result.answer().contains("Elm"));
    }

    #[tokio::test]
    async fn empty_maintenance_history_falls_through_to_default() {
        let store = MockRecordStore::from_sample_data();
        let engine = QueryEngine::new(Arc::new(store.clone()));

        let result = engine
            .answer_query_on("roof at galaxy", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::SystemOverview);
        assert_eq!(store.calls()[0], "list_maintenance_issues");
        assert!(!store.calls().contains(&"find_property".to_string()));
    }

    #[tokio::test]
    async fn empty_maintenance_history_falls_through_to_next_rule() {
        let result = sample_engine()
            .answer_query_on("roof at galaxy, what did maintenance cost?", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::FinancialSummary);
    }

    #[tokio::test]
    async fn maintenance_history_falls_back_to_property_id_without_property() {
        let store = MockRecordStore::new().with_issue(MaintenanceIssue {
            cost: Decimal::from(200),
            vendor: "Roofers".to_string(),
            description: "Loose shingles".to_string(),
            ..test_issue(1, "12_elm_street", "roof", date("2024-04-01"))
        });
        let result = QueryEngine::new(Arc::new(store))
            .answer_query_on("roof elm", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(
            result.answer(),
            "The roof at 12_elm_street was last repaired on 2024-04-01 by Roofers ($200.00). Issue: Loose shingles"
        );
    }

    #[tokio::test]
    async fn heating_2023_filters_category_and_year() {
        let result = sample_engine()
            .answer_query_on("heating 2023", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::FilteredMaintenance);
        assert_eq!(result.answer(), "Found 1 heating complaint(s) in 2023.");
        match &result.data()[0] {
            AnswerRow::MaintenanceIssueWithAddress(row) => {
                assert_eq!(row.issue.category, "heating");
                assert_eq!(row.issue.date, date("2023-11-20"));
                assert_eq!(row.address, "45 Oak Avenue");
            }
            other => panic!("unexpected row {:?}", other),
        }
    }

    #[tokio::test]
    async fn heating_2023_with_no_matches_still_answers() {
        let store = MockRecordStore::new()
            .with_property(test_property("45_oak_avenue", "45 Oak Avenue"))
            .with_issue(test_issue(1, "45_oak_avenue", "heating", date("2024-01-05")))
            .with_issue(test_issue(2, "45_oak_avenue", "plumbing", date("2023-01-05")));

        let result = QueryEngine::new(Arc::new(store))
            .answer_query_on("Heating complaints in 2023", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::FilteredMaintenance);
        assert_eq!(result.answer(), "Found 0 heating complaint(s) in 2023.");
        assert!(result.data().is_empty());
    }

    #[tokio::test]
    async fn expiring_leases_window_is_inclusive_and_ascending() {
        // 2025-01-01 + 180 days = 2025-06-30, the Oak Avenue lease end
        let result = sample_engine()
            .answer_query_on("lease expiring", date("2025-01-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::ExpiringLeases);
        assert_eq!(
            result.answer(),
            "Found 2 lease(s) expiring in the next 6 months."
        );
        assert_eq!(property_ids(&result), vec!["delhi_villa", "45_oak_avenue"]);
    }

    #[tokio::test]
    async fn lease_one_day_past_window_is_excluded() {
        let store = MockRecordStore::from_sample_data()
            .with_property(Property {
                lease_end_date: Some(date("2025-06-30")),
                ..test_property("last_day_lease", "1 Boundary Road")
            })
            .with_property(Property {
                lease_end_date: Some(date("2025-07-01")),
                ..test_property("day_after_lease", "2 Boundary Road")
            });

        let result = QueryEngine::new(Arc::new(store))
            .answer_query_on("lease expiring", date("2025-01-01"))
            .await
            .unwrap();

        let ids = property_ids(&result);
        assert!(ids.contains(&"last_day_lease".to_string()));
        assert!(!ids.contains(&"day_after_lease".to_string()));
        assert_eq!(result.answer(), "Found 3 lease(s) expiring in the next 6 months.");
    }

    #[tokio::test]
    async fn lease_ending_today_counts_as_expiring() {
        let result = sample_engine()
            .answer_query_on("Which leases end soon?", date("2024-12-31"))
            .await
            .unwrap();

        assert_eq!(property_ids(&result), vec!["mumbai_galaxy", "delhi_villa"]);
    }

    #[tokio::test]
    async fn lease_expiry_excludes_past_leases() {
        let result = sample_engine()
            .answer_query_on("lease expiring", date("2030-01-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::ExpiringLeases);
        assert_eq!(result.answer(), "Found 0 lease(s) expiring in the next 6 months.");
    }

    #[tokio::test]
    async fn maintenance_cost_totals_all_groups() {
        let result = sample_engine()
            .answer_query_on("What is the total maintenance cost?", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::FinancialSummary);
        assert_eq!(
            result.answer(),
            "Total maintenance costs across all properties: $40,350.00"
        );
        assert_eq!(result.data().len(), 6);
    }

    #[tokio::test]
    async fn maintenance_cost_skips_issues_without_property() {
        let store = MockRecordStore::new()
            .with_property(test_property("12_elm_street", "12 Elm Street"))
            .with_issue(MaintenanceIssue {
                cost: Decimal::from(100),
                ..test_issue(1, "12_elm_street", "roof", date("2024-01-01"))
            })
            .with_issue(MaintenanceIssue {
                cost: Decimal::from(900),
                ..test_issue(2, "ghost_property", "roof", date("2024-01-02"))
            });

        let result = QueryEngine::new(Arc::new(store))
            .answer_query_on("maintenance cost", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(
            result.answer(),
            "Total maintenance costs across all properties: $100.00"
        );
    }

    #[tokio::test]
    async fn triple_net_matches_lease_type_exactly() {
        let store = MockRecordStore::from_sample_data().with_property(Property {
            lease_type: Some("triple net".to_string()),
            ..test_property("lowercase_lease", "1 Lower Street")
        });

        let result = QueryEngine::new(Arc::new(store))
            .answer_query_on("Show me TRIPLE NET properties", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::LeaseTypeInfo);
        assert_eq!(result.answer(), "Found 2 Triple Net Lease properties.");
        assert_eq!(property_ids(&result), vec!["bangalore_tech", "12_elm_street"]);
    }

    #[tokio::test]
    async fn recurring_issues_group_by_property_and_category() {
        let result = sample_engine()
            .answer_query_on("Any recurring issues?", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::RecurringIssues);
        assert_eq!(
            result.answer(),
            "Found 1 recurring maintenance issues across properties."
        );
        match &result.data()[0] {
            AnswerRow::RecurringIssue(group) => {
                assert_eq!(group.property_id, "12_elm_street");
                assert_eq!(group.category, "plumbing");
                assert_eq!(group.occurrence_count, 2);
                assert_eq!(group.dates, "2024-02-10,2024-08-15");
                assert_eq!(group.total_cost, Decimal::from(800));
            }
            other => panic!("unexpected row {:?}", other),
        }
    }

    #[tokio::test]
    async fn recurring_issues_most_frequent_first() {
        let store = MockRecordStore::new()
            .with_issue(test_issue(1, "a", "roof", date("2024-01-01")))
            .with_issue(test_issue(2, "a", "roof", date("2024-02-01")))
            .with_issue(test_issue(3, "b", "plumbing", date("2024-01-01")))
            .with_issue(test_issue(4, "b", "plumbing", date("2024-03-01")))
            .with_issue(test_issue(5, "b", "plumbing", date("2024-02-01")))
            .with_issue(test_issue(6, "c", "heating", date("2024-02-01")));

        let result = QueryEngine::new(Arc::new(store))
            .answer_query_on("multiple repairs", date("2024-11-01"))
            .await
            .unwrap();

        let groups: Vec<(String, i64, String)> = result
            .data()
            .iter()
            .map(|row| match row {
                AnswerRow::RecurringIssue(group) => (
                    group.property_id.clone(),
                    group.occurrence_count,
                    group.dates.clone(),
                ),
                other => panic!("unexpected row {:?}", other),
            })
            .collect();
        assert_eq!(
            groups,
            vec![
                ("b".to_string(), 3, "2024-01-01,2024-02-01,2024-03-01".to_string()),
                ("a".to_string(), 2, "2024-01-01,2024-02-01".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unmatched_query_gets_system_overview() {
        let result = sample_engine()
            .answer_query_on("random gibberish", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(result.query_type(), QueryType::SystemOverview);
        assert_eq!(
            result.answer(),
            "System Overview: 6 properties, $370,000.00 total monthly rent, 2 active maintenance issues."
        );
        assert!(result.data().is_empty());
    }

    #[tokio::test]
    async fn system_overview_on_empty_store() {
        let result = QueryEngine::new(Arc::new(MockRecordStore::new()))
            .answer_query_on("", date("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(
            result.answer(),
            "System Overview: 0 properties, $0.00 total monthly rent, 0 active maintenance issues."
        );
    }

    #[tokio::test]
    async fn same_query_same_answer() {
        let engine = sample_engine();
        for text in ["roof elm", "heating 2023", "lease expiring", "recurring", "hello"] {
            let first = engine.answer_query_on(text, date("2025-01-01")).await.unwrap();
            let second = engine.answer_query_on(text, date("2025-01-01")).await.unwrap();
            assert_eq!(first, second);
        }
    }

    #[tokio::test]
    async fn store_failure_is_surfaced_not_swallowed() {
        let engine = QueryEngine::new(Arc::new(MockRecordStore::from_sample_data().failing()));

        for text in ["roof elm", "triple net", "random gibberish"] {
            let err = engine
                .answer_query_on(text, date("2024-11-01"))
                .await
                .unwrap_err();
            assert!(matches!(err, QueryError::StoreUnavailable(_)));
            assert!(err.to_string().contains("connection refused"));
        }
    }

    #[tokio::test]
    async fn classifier_only_reads() {
        let store = MockRecordStore::from_sample_data();
        let engine = QueryEngine::new(Arc::new(store.clone()));
        engine.answer_query_on("maintenance cost", date("2024-11-01")).await.unwrap();

        assert_eq!(store.calls(), vec!["aggregate_maintenance_cost_by_property"]);
    }
}
