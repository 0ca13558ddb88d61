//! # Profile Repository
//!
//! Staff profiles and their roles. Credentials live outside this database;
//! a profile id is trusted as given.

use chrono::Utc;
use clipper_core::validation::validate_name;
use clipper_core::{Profile, Role};
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};

const SELECT_PROFILE: &str = r#"
    SELECT id, full_name, email, role, created_at, updated_at
    FROM profiles
"#;

/// Repository for profile database operations.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Creates a profile with the given role.
    pub async fn create(&self, full_name: &str, email: Option<&str>, role: Role) -> DbResult<Profile> {
        validate_name("full name", full_name)?;

        let now = Utc::now();
        let profile = Profile {
            id: generate_id(),
            full_name: full_name.trim().to_string(),
            email: email.map(|e| e.trim().to_lowercase()),
            role,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %profile.id, role = %role, "Inserting profile");

        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, email, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(profile.role)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(profile.email.as_deref()))?;

        Ok(profile)
    }

    /// Gets a profile by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!("{SELECT_PROFILE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// The role of a profile, `None` when the profile does not exist.
    pub async fn role_of(&self, id: &str) -> DbResult<Option<Role>> {
        let role = sqlx::query_scalar::<_, Role>("SELECT role FROM profiles WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    /// Lists all profiles by name.
    pub async fn list(&self) -> DbResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(&format!("{SELECT_PROFILE} ORDER BY full_name"))
            .fetch_all(&self.pool)
            .await?;

        Ok(profiles)
    }

    /// Changes a profile's display name.
    pub async fn rename(&self, id: &str, full_name: &str) -> DbResult<Profile> {
        validate_name("full name", full_name)?;
        debug!(id = %id, "Renaming profile");

        let result = sqlx::query("UPDATE profiles SET full_name = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(full_name.trim())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Profile", id));
        }

        self.get(id).await?.ok_or_else(|| DbError::not_found("Profile", id))
    }

    /// Assigns a role to a profile.
    pub async fn set_role(&self, id: &str, role: Role) -> DbResult<Profile> {
        debug!(id = %id, role = %role, "Assigning role");

        let result = sqlx::query("UPDATE profiles SET role = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(role)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Profile", id));
        }

        self.get(id).await?.ok_or_else(|| DbError::not_found("Profile", id))
    }
}
