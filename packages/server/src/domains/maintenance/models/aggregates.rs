// Grouped maintenance aggregates

use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Maintenance spend for one property address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PropertyCostSummary {
    pub address: String,
    pub total_cost: Decimal,
    pub issue_count: i64,
}

/// A (property, category) pair that needed repair more than once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecurringIssue {
    pub property_id: String,
    pub category: String,
    pub occurrence_count: i64,
    /// Comma-separated issue dates, oldest first
    pub dates: String,
    pub total_cost: Decimal,
}

impl PropertyCostSummary {
    /// Cost and issue count per address, for issues whose property exists.
    pub async fn by_property(pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT p.address,
                   COALESCE(SUM(m.cost), 0) AS total_cost,
                   COUNT(*) AS issue_count
            FROM maintenance_issues m
            INNER JOIN properties p ON m.property_id = p.id
            GROUP BY p.address
            ORDER BY p.address COLLATE "C"
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

impl RecurringIssue {
    /// Groups with at least `min_occurrences` issues, most frequent first.
    pub async fn find_all(min_occurrences: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT property_id,
                   category,
                   COUNT(*) AS occurrence_count,
                   STRING_AGG(issue_date::text, ',' ORDER BY issue_date, id) AS dates,
                   COALESCE(SUM(cost), 0) AS total_cost
            FROM maintenance_issues
            GROUP BY property_id, category
            HAVING COUNT(*) >= $1
            ORDER BY occurrence_count DESC, property_id COLLATE "C", category COLLATE "C"
            "#,
        )
        .bind(min_occurrences)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
