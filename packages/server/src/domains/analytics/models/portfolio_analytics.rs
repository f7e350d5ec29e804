use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domains::maintenance::{IssueStatus, MaintenanceIssue};
use crate::domains::properties::Property;

/// Issue count and spend for one maintenance category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryBreakdown {
    pub category: String,
    pub count: i64,
    pub total_cost: Decimal,
}

/// Portfolio-wide dashboard figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalytics {
    pub total_properties: i64,
    pub total_monthly_rent: Decimal,
    pub active_issues: i64,
    pub total_maintenance_cost: Decimal,
    pub issues_by_category: Vec<CategoryBreakdown>,
}

impl CategoryBreakdown {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT category, COUNT(*) AS count, COALESCE(SUM(cost), 0) AS total_cost
            FROM maintenance_issues
            GROUP BY category
            ORDER BY category COLLATE "C"
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

impl PortfolioAnalytics {
    pub async fn compute(pool: &PgPool) -> Result<Self> {
        let (total_maintenance_cost,) = sqlx::query_as::<_, (Option<Decimal>,)>(
            "SELECT SUM(cost) FROM maintenance_issues",
        )
        .fetch_one(pool)
        .await?;

        Ok(Self {
            total_properties: Property::count(pool).await?,
            total_monthly_rent: Property::sum_rent_amount(pool).await?.unwrap_or_default(),
            active_issues: MaintenanceIssue::count_by_status(IssueStatus::InProgress, pool).await?,
            total_maintenance_cost: total_maintenance_cost.unwrap_or_default(),
            issues_by_category: CategoryBreakdown::find_all(pool).await?,
        })
    }
}
