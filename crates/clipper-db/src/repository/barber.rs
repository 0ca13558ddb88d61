//! # Barber Repository

use chrono::Utc;
use clipper_core::validation::validate_name;
use clipper_core::Barber;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};

const SELECT_BARBER: &str = r#"
    SELECT id, name, phone, is_active, created_at, updated_at
    FROM barbers
"#;

/// Repository for barber database operations.
#[derive(Debug, Clone)]
pub struct BarberRepository {
    pool: SqlitePool,
}

impl BarberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BarberRepository { pool }
    }

    /// Creates an active barber.
    pub async fn create(&self, name: &str, phone: Option<&str>) -> DbResult<Barber> {
        validate_name("name", name)?;

        let now = Utc::now();
        let barber = Barber {
            id: generate_id(),
            name: name.trim().to_string(),
            phone: phone.map(str::trim).filter(|p| !p.is_empty()).map(String::from),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %barber.id, name = %barber.name, "Inserting barber");

        sqlx::query(
            r#"
            INSERT INTO barbers (id, name, phone, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&barber.id)
        .bind(&barber.name)
        .bind(&barber.phone)
        .bind(barber.is_active)
        .bind(barber.created_at)
        .bind(barber.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(barber)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Barber>> {
        let barber = sqlx::query_as::<_, Barber>(&format!("{SELECT_BARBER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(barber)
    }

    /// Lists barbers by name, optionally only the active ones.
    pub async fn list(&self, active_only: bool) -> DbResult<Vec<Barber>> {
        let barbers = sqlx::query_as::<_, Barber>(&format!(
            "{SELECT_BARBER} WHERE (?1 = 0 OR is_active = 1) ORDER BY name"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(barbers)
    }

    /// Updates name and phone.
    pub async fn update(&self, id: &str, name: &str, phone: Option<&str>) -> DbResult<Barber> {
        validate_name("name", name)?;
        debug!(id = %id, "Updating barber");

        let result = sqlx::query(
            "UPDATE barbers SET name = ?2, phone = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(name.trim())
        .bind(phone.map(str::trim).filter(|p| !p.is_empty()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Barber", id));
        }

        self.get(id).await?.ok_or_else(|| DbError::not_found("Barber", id))
    }

    /// Activates or deactivates a barber. Past transactions keep their
    /// reference either way.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        debug!(id = %id, active, "Setting barber active flag");

        let result = sqlx::query("UPDATE barbers SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Barber", id));
        }

        Ok(())
    }

    /// Deletes a barber with no transactions.
    ///
    /// ## Errors
    /// `ForeignKeyViolation` when any transaction references the barber;
    /// deactivate instead.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting barber");

        let result = sqlx::query("DELETE FROM barbers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Barber", id));
        }

        Ok(())
    }
}
