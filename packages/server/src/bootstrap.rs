//! One-time store initialization: schema migrations and sample data.
//!
//! Runs before the query engine or any route can touch the database.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domains::maintenance::{IssueStatus, NewMaintenanceIssue};
use crate::domains::properties::NewProperty;
use crate::domains::users::{hash_password, UserRole};

/// Run migrations, then seed sample data if asked to and the store is empty.
pub async fn initialize(pool: &PgPool, seed: bool) -> Result<()> {
    run_migrations(pool).await?;
    if seed {
        seed_sample_data(pool).await?;
    }
    Ok(())
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");
    Ok(())
}

/// Insert the sample portfolio and users in one transaction.
///
/// Returns `false` without writing anything when properties already exist.
pub async fn seed_sample_data(pool: &PgPool) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let (existing,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM properties")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        tracing::debug!(existing, "Properties present, skipping sample data");
        return Ok(false);
    }

    let properties = sample_properties();
    for property in &properties {
        sqlx::query(
            r#"
            INSERT INTO properties (
                id, address, property_type, tenant_name, lease_type, rent_amount,
                lease_start_date, lease_end_date, landlord_name, tax_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&property.id)
        .bind(&property.address)
        .bind(&property.property_type)
        .bind(&property.tenant_name)
        .bind(&property.lease_type)
        .bind(property.rent_amount)
        .bind(property.lease_start_date)
        .bind(property.lease_end_date)
        .bind(&property.landlord_name)
        .bind(&property.tax_id)
        .execute(&mut *tx)
        .await?;
    }

    let issues = sample_issues();
    for issue in &issues {
        sqlx::query(
            r#"
            INSERT INTO maintenance_issues (property_id, category, description, issue_date, status, cost, vendor)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&issue.property_id)
        .bind(&issue.category)
        .bind(&issue.description)
        .bind(issue.date)
        .bind(issue.status.as_str())
        .bind(issue.cost)
        .bind(&issue.vendor)
        .execute(&mut *tx)
        .await?;
    }

    for (username, password, role, property_id) in SAMPLE_USERS {
        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, property_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(hash_password(username, password))
        .bind(role.as_str())
        .bind(property_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!(
        properties = properties.len(),
        issues = issues.len(),
        users = SAMPLE_USERS.len(),
        "Seeded sample data"
    );
    Ok(true)
}

const SAMPLE_USERS: [(&str, &str, UserRole, Option<&str>); 3] = [
    ("admin", "admin123", UserRole::Owner, None),
    ("chintu", "Chintu123", UserRole::Tenant, Some("mumbai_galaxy")),
    ("suresh", "tenant123", UserRole::Tenant, Some("bangalore_tech")),
];

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

#[allow(clippy::too_many_arguments)]
fn property(
    id: &str,
    address: &str,
    property_type: &str,
    tenant_name: &str,
    lease_type: &str,
    rent_amount: i64,
    lease_start_date: Option<NaiveDate>,
    lease_end_date: Option<NaiveDate>,
    landlord: Option<(&str, &str)>,
) -> NewProperty {
    NewProperty {
        id: id.to_string(),
        address: address.to_string(),
        property_type: Some(property_type.to_string()),
        tenant_name: Some(tenant_name.to_string()),
        lease_type: Some(lease_type.to_string()),
        rent_amount: Some(Decimal::from(rent_amount)),
        lease_start_date,
        lease_end_date,
        landlord_name: landlord.map(|(name, _)| name.to_string()),
        tax_id: landlord.map(|(_, tax_id)| tax_id.to_string()),
    }
}

/// The sample portfolio: three US and three Indian properties
pub fn sample_properties() -> Vec<NewProperty> {
    vec![
        property(
            "12_elm_street",
            "12 Elm Street",
            "Commercial",
            "Acme Corp",
            "Triple Net",
            5000,
            date(2023, 1, 15),
            date(2028, 1, 14),
            None,
        ),
        property(
            "45_oak_avenue",
            "45 Oak Avenue",
            "Residential",
            "Smith Family",
            "Gross Lease",
            2500,
            date(2024, 1, 1),
            date(2025, 6, 30),
            None,
        ),
        property(
            "78_pine_road",
            "78 Pine Road",
            "Mixed Use",
            "Tech Startup Inc",
            "Modified Gross",
            7500,
            date(2024, 6, 1),
            date(2026, 12, 31),
            None,
        ),
        property(
            "mumbai_galaxy",
            "101, Galaxy Heights, Bandra West, Mumbai",
            "Residential",
            "Chintu",
            "11-Month Agreement",
            85000,
            date(2024, 1, 1),
            date(2024, 12, 31),
            Some(("Ishaan Chawla", "ABCPV1234A")),
        ),
        property(
            "bangalore_tech",
            "Unit 402, Tech Park View, Koramangala, Bangalore",
            "Commercial",
            "Innovate Solutions Pvt Ltd",
            "Triple Net",
            150000,
            date(2023, 4, 1),
            date(2026, 3, 31),
            Some(("Ishaan Chawla", "XYZPM5678B")),
        ),
        property(
            "delhi_villa",
            "Villa 12, Green Park, South Delhi",
            "Residential",
            "Mehta Family",
            "Standard Lease",
            120000,
            date(2024, 6, 1),
            date(2025, 5, 31),
            Some(("Ishaan Chawla", "PQRSJ9012C")),
        ),
    ]
}

fn issue(
    property_id: &str,
    category: &str,
    description: &str,
    date: NaiveDate,
    status: IssueStatus,
    cost: i64,
    vendor: &str,
) -> NewMaintenanceIssue {
    NewMaintenanceIssue {
        property_id: property_id.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        date,
        status,
        cost: Decimal::from(cost),
        vendor: vendor.to_string(),
    }
}

/// Maintenance history for the sample portfolio, in insertion order
pub fn sample_issues() -> Vec<NewMaintenanceIssue> {
    use IssueStatus::{InProgress, Resolved};

    let rows = [
        ("12_elm_street", "roof", "Water infiltration northeast corner", (2023, 3, 15), Resolved, 3200, "ABC Roofing"),
        ("45_oak_avenue", "heating", "HVAC system failure - no heat", (2023, 11, 20), Resolved, 1500, "Climate Control Co"),
        ("12_elm_street", "plumbing", "Bathroom leak on 2nd floor", (2024, 2, 10), Resolved, 450, "Quick Plumbers"),
        ("78_pine_road", "electrical", "Circuit breaker tripping issues", (2024, 5, 22), InProgress, 0, "ElectroFix"),
        ("12_elm_street", "plumbing", "Kitchen sink backup", (2024, 8, 15), Resolved, 350, "Quick Plumbers"),
        ("mumbai_galaxy", "plumbing", "Monsoon leakage in master bedroom wall", (2024, 7, 15), Resolved, 4500, "QuickFix Utilities"),
        ("bangalore_tech", "electrical", "UPS Battery replacement for server room", (2024, 2, 20), Resolved, 12000, "PowerSafe Ltd"),
        ("mumbai_galaxy", "electrical", "Geyser switch burnout", (2024, 8, 10), Resolved, 850, "Local Electrician"),
        ("delhi_villa", "gardening", "Seasonal lawn maintenance and pruning", (2024, 9, 5), InProgress, 2500, "Green Thumbs"),
        ("mumbai_galaxy", "painting", "Living room touch-up paint", (2024, 1, 10), Resolved, 15000, "Asian Paints Service"),
    ];

    rows.into_iter()
        .filter_map(|(property_id, category, description, (y, m, d), status, cost, vendor)| {
            Some(issue(property_id, category, description, date(y, m, d)?, status, cost, vendor))
        })
        .collect()
}
