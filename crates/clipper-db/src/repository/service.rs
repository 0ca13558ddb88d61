//! # Service Repository
//!
//! The price list. Prices and commissions are copied onto transaction lines
//! at checkout, so editing a service never rewrites history.

use chrono::Utc;
use clipper_core::validation::{validate_cents, validate_name};
use clipper_core::{Service, ValidationError};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};

const SELECT_SERVICE: &str = r#"
    SELECT id, name, price_cents, commission_cents, duration_minutes,
           is_active, created_at, updated_at
    FROM services
"#;

/// Editable fields of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub commission_cents: i64,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
}

impl NewService {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        validate_cents("price", self.price_cents)?;
        validate_cents("commission", self.commission_cents)?;
        if let Some(minutes) = self.duration_minutes {
            if minutes <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "duration".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Repository for service database operations.
#[derive(Debug, Clone)]
pub struct ServiceRepository {
    pool: SqlitePool,
}

impl ServiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ServiceRepository { pool }
    }

    /// Creates an active service.
    pub async fn create(&self, input: &NewService) -> DbResult<Service> {
        input.validate()?;

        let now = Utc::now();
        let service = Service {
            id: generate_id(),
            name: input.name.trim().to_string(),
            price_cents: input.price_cents,
            commission_cents: input.commission_cents,
            duration_minutes: input.duration_minutes,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %service.id, name = %service.name, price = %service.price(), "Inserting service");

        sqlx::query(
            r#"
            INSERT INTO services (
                id, name, price_cents, commission_cents, duration_minutes,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&service.id)
        .bind(&service.name)
        .bind(service.price_cents)
        .bind(service.commission_cents)
        .bind(service.duration_minutes)
        .bind(service.is_active)
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(service)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>(&format!("{SELECT_SERVICE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(service)
    }

    /// Lists services by name, optionally only the active ones.
    pub async fn list(&self, active_only: bool) -> DbResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(&format!(
            "{SELECT_SERVICE} WHERE (?1 = 0 OR is_active = 1) ORDER BY name"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    /// Replaces the editable fields of a service.
    pub async fn update(&self, id: &str, input: &NewService) -> DbResult<Service> {
        input.validate()?;
        debug!(id = %id, "Updating service");

        let result = sqlx::query(
            r#"
            UPDATE services SET
                name = ?2,
                price_cents = ?3,
                commission_cents = ?4,
                duration_minutes = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.price_cents)
        .bind(input.commission_cents)
        .bind(input.duration_minutes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", id));
        }

        self.get(id).await?.ok_or_else(|| DbError::not_found("Service", id))
    }

    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        debug!(id = %id, active, "Setting service active flag");

        let result = sqlx::query("UPDATE services SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", id));
        }

        Ok(())
    }

    /// Deletes a service no transaction line references.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting service");

        let result = sqlx::query("DELETE FROM services WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Service", id));
        }

        Ok(())
    }
}
