use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::DateRange;

/// A leased property in the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Property {
    pub id: String,
    pub address: String,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub tenant_name: Option<String>,
    pub lease_type: Option<String>, // 'Triple Net', 'Gross Lease', ...
    pub rent_amount: Option<Decimal>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub landlord_name: Option<String>,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub id: String,
    pub address: String,
    #[serde(rename = "type", default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub lease_type: Option<String>,
    #[serde(default)]
    pub rent_amount: Option<Decimal>,
    #[serde(default)]
    pub lease_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub lease_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub landlord_name: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

/// Filter for property listings. `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    /// Exact, case-sensitive match
    pub lease_type: Option<String>,
    /// Inclusive; properties without a lease end date never match
    pub lease_end_range: Option<DateRange>,
}

impl NewProperty {
    pub fn into_property(self, created_at: DateTime<Utc>) -> Property {
        Property {
            id: self.id,
            address: self.address,
            property_type: self.property_type,
            tenant_name: self.tenant_name,
            lease_type: self.lease_type,
            rent_amount: self.rent_amount,
            lease_start_date: self.lease_start_date,
            lease_end_date: self.lease_end_date,
            landlord_name: self.landlord_name,
            tax_id: self.tax_id,
            created_at,
        }
    }
}

impl Property {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let properties =
            sqlx::query_as::<_, Self>("SELECT * FROM properties ORDER BY id COLLATE \"C\"")
                .fetch_all(pool)
                .await?;
        Ok(properties)
    }

    pub async fn find_by_id(id: &str, pool: &PgPool) -> Result<Option<Self>> {
        let property = sqlx::query_as::<_, Self>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(property)
    }

    /// Properties matching the filter, soonest lease end first.
    pub async fn find_filtered(filter: &PropertyFilter, pool: &PgPool) -> Result<Vec<Self>> {
        let (end_from, end_to) = match filter.lease_end_range {
            Some(range) => (Some(range.start), Some(range.end)),
            None => (None, None),
        };

        let properties = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM properties
            WHERE ($1::text IS NULL OR lease_type = $1)
              AND ($2::date IS NULL OR lease_end_date >= $2)
              AND ($3::date IS NULL OR lease_end_date <= $3)
            ORDER BY lease_end_date ASC NULLS LAST, id COLLATE "C" ASC
            "#,
        )
        .bind(filter.lease_type.as_deref())
        .bind(end_from)
        .bind(end_to)
        .fetch_all(pool)
        .await?;
        Ok(properties)
    }

    pub async fn create(input: NewProperty, pool: &PgPool) -> Result<Self> {
        let property = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO properties (
                id, address, property_type, tenant_name, lease_type, rent_amount,
                lease_start_date, lease_end_date, landlord_name, tax_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&input.id)
        .bind(&input.address)
        .bind(&input.property_type)
        .bind(&input.tenant_name)
        .bind(&input.lease_type)
        .bind(input.rent_amount)
        .bind(input.lease_start_date)
        .bind(input.lease_end_date)
        .bind(&input.landlord_name)
        .bind(&input.tax_id)
        .fetch_one(pool)
        .await?;
        Ok(property)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM properties")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Total monthly rent; `None` when there is nothing to sum.
    pub async fn sum_rent_amount(pool: &PgPool) -> Result<Option<Decimal>> {
        let (total,) =
            sqlx::query_as::<_, (Option<Decimal>,)>("SELECT SUM(rent_amount) FROM properties")
                .fetch_one(pool)
                .await?;
        Ok(total)
    }
}
