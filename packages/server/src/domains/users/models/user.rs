use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

/// Portal roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Owner,
    Tenant,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Owner => "owner",
            UserRole::Tenant => "tenant",
        }
    }
}

/// A portal account. Tenants are tied to the property they rent.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub property_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Hex SHA-256 of `username:password`; the username acts as a per-account salt.
pub fn hash_password(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl User {
    pub fn verify_password(&self, password: &str) -> bool {
        hash_password(&self.username, password) == self.password_hash
    }

    pub async fn find_by_username(username: &str, pool: &PgPool) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Look up a user and check the password. `None` for unknown users and wrong passwords alike.
    pub async fn authenticate(username: &str, password: &str, pool: &PgPool) -> Result<Option<Self>> {
        let user = Self::find_by_username(username, pool).await?;
        Ok(user.filter(|user| user.verify_password(password)))
    }

    pub async fn create(
        username: &str,
        password: &str,
        role: UserRole,
        property_id: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (username, password_hash, role, property_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(hash_password(username, password))
        .bind(role.as_str())
        .bind(property_id)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }
}
