use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use crate::common::{DateRange, SortOrder};

/// Lifecycle of a maintenance issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "Open",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Open" => Ok(IssueStatus::Open),
            "In Progress" => Ok(IssueStatus::InProgress),
            "Resolved" => Ok(IssueStatus::Resolved),
            other => anyhow::bail!("Unknown issue status: {other}"),
        }
    }
}

/// A maintenance issue reported against a property.
///
/// `property_id` is not checked against `properties` at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceIssue {
    pub id: i64,
    pub property_id: String,
    pub category: String,
    pub description: String,
    #[sqlx(rename = "issue_date")]
    pub date: NaiveDate,
    pub status: String,
    pub cost: Decimal,
    pub vendor: String,
    pub created_at: DateTime<Utc>,
}

/// Maintenance issue joined with the address of its property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceIssueWithAddress {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub issue: MaintenanceIssue,
    pub address: String,
}

/// Input for reporting a maintenance issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMaintenanceIssue {
    pub property_id: String,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub status: IssueStatus,
    #[serde(default)]
    pub cost: Decimal,
    pub vendor: String,
}

/// Filter for maintenance listings. `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceFilter {
    pub property_id: Option<String>,
    /// Exact, case-sensitive match
    pub category: Option<String>,
    pub date_range: Option<DateRange>,
}

impl MaintenanceFilter {
    pub fn for_property(property_id: &str) -> Self {
        Self {
            property_id: Some(property_id.to_string()),
            ..Default::default()
        }
    }

    pub fn matches(&self, issue: &MaintenanceIssue) -> bool {
        self.property_id
            .as_deref()
            .map_or(true, |id| issue.property_id == id)
            && self
                .category
                .as_deref()
                .map_or(true, |category| issue.category == category)
            && self
                .date_range
                .map_or(true, |range| range.contains(issue.date))
    }

    fn bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self.date_range {
            Some(range) => (Some(range.start), Some(range.end)),
            None => (None, None),
        }
    }
}

fn order_clause(order: SortOrder, alias: &str) -> String {
    match order {
        SortOrder::Ascending => format!("{alias}issue_date ASC, {alias}id ASC"),
        SortOrder::Descending => format!("{alias}issue_date DESC, {alias}id DESC"),
    }
}

impl NewMaintenanceIssue {
    pub fn into_issue(self, id: i64, created_at: DateTime<Utc>) -> MaintenanceIssue {
        MaintenanceIssue {
            id,
            property_id: self.property_id,
            category: self.category,
            description: self.description,
            date: self.date,
            status: self.status.as_str().to_string(),
            cost: self.cost,
            vendor: self.vendor,
            created_at,
        }
    }
}

impl MaintenanceIssue {
    pub async fn find_filtered(
        filter: &MaintenanceFilter,
        order: SortOrder,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let (date_from, date_to) = filter.bounds();
        let sql = format!(
            r#"
            SELECT * FROM maintenance_issues
            WHERE ($1::text IS NULL OR property_id = $1)
              AND ($2::text IS NULL OR category = $2)
              AND ($3::date IS NULL OR issue_date >= $3)
              AND ($4::date IS NULL OR issue_date <= $4)
            ORDER BY {}
            "#,
            order_clause(order, "")
        );

        let issues = sqlx::query_as::<_, Self>(&sql)
            .bind(filter.property_id.as_deref())
            .bind(filter.category.as_deref())
            .bind(date_from)
            .bind(date_to)
            .fetch_all(pool)
            .await?;
        Ok(issues)
    }

    /// Issues matching the filter whose property exists, with its address.
    pub async fn find_filtered_with_address(
        filter: &MaintenanceFilter,
        order: SortOrder,
        pool: &PgPool,
    ) -> Result<Vec<MaintenanceIssueWithAddress>> {
        let (date_from, date_to) = filter.bounds();
        let sql = format!(
            r#"
            SELECT m.*, p.address
            FROM maintenance_issues m
            INNER JOIN properties p ON m.property_id = p.id
            WHERE ($1::text IS NULL OR m.property_id = $1)
              AND ($2::text IS NULL OR m.category = $2)
              AND ($3::date IS NULL OR m.issue_date >= $3)
              AND ($4::date IS NULL OR m.issue_date <= $4)
            ORDER BY {}
            "#,
            order_clause(order, "m.")
        );

        let issues = sqlx::query_as::<_, MaintenanceIssueWithAddress>(&sql)
            .bind(filter.property_id.as_deref())
            .bind(filter.category.as_deref())
            .bind(date_from)
            .bind(date_to)
            .fetch_all(pool)
            .await?;
        Ok(issues)
    }

    pub async fn create(input: NewMaintenanceIssue, pool: &PgPool) -> Result<Self> {
        let issue = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO maintenance_issues (property_id, category, description, issue_date, status, cost, vendor)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.property_id)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.date)
        .bind(input.status.as_str())
        .bind(input.cost)
        .bind(&input.vendor)
        .fetch_one(pool)
        .await?;
        Ok(issue)
    }

    pub async fn count_by_status(status: IssueStatus, pool: &PgPool) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM maintenance_issues WHERE status = $1",
        )
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
