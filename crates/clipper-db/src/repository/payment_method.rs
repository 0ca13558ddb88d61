//! # Payment Method Repository

use chrono::Utc;
use clipper_core::validation::validate_name;
use clipper_core::PaymentMethod;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};

const SELECT_PAYMENT_METHOD: &str = r#"
    SELECT id, name, is_active, created_at
    FROM payment_methods
"#;

/// Repository for payment method database operations.
#[derive(Debug, Clone)]
pub struct PaymentMethodRepository {
    pool: SqlitePool,
}

impl PaymentMethodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentMethodRepository { pool }
    }

    /// Creates an active payment method. Names are unique.
    pub async fn create(&self, name: &str) -> DbResult<PaymentMethod> {
        validate_name("name", name)?;

        let method = PaymentMethod {
            id: generate_id(),
            name: name.trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %method.id, name = %method.name, "Inserting payment method");

        sqlx::query(
            "INSERT INTO payment_methods (id, name, is_active, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&method.id)
        .bind(&method.name)
        .bind(method.is_active)
        .bind(method.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(Some(&method.name)))?;

        Ok(method)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<PaymentMethod>> {
        let method = sqlx::query_as::<_, PaymentMethod>(&format!(
            "{SELECT_PAYMENT_METHOD} WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(method)
    }

    pub async fn list(&self, active_only: bool) -> DbResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(&format!(
            "{SELECT_PAYMENT_METHOD} WHERE (?1 = 0 OR is_active = 1) ORDER BY name"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    pub async fn rename(&self, id: &str, name: &str) -> DbResult<PaymentMethod> {
        validate_name("name", name)?;
        debug!(id = %id, "Renaming payment method");

        let result = sqlx::query("UPDATE payment_methods SET name = ?2 WHERE id = ?1")
            .bind(id)
            .bind(name.trim())
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(Some(name.trim())))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentMethod", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("PaymentMethod", id))
    }

    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        debug!(id = %id, active, "Setting payment method active flag");

        let result = sqlx::query("UPDATE payment_methods SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentMethod", id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting payment method");

        let result = sqlx::query("DELETE FROM payment_methods WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentMethod", id));
        }

        Ok(())
    }
}
