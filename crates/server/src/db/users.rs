//! User repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use denfit_core::{Email, UserId, UserProfile};

use super::{RepositoryError, map_unique_violation};

/// A user row, including credential material.
///
/// Never serialized to the wire; handlers convert to [`UserProfile`] via
/// [`User::profile`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub reset_passcode_hash: Option<String>,
    pub reset_passcode_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The wire-facing profile for this user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored email fails
    /// validation.
    pub fn profile(&self) -> Result<UserProfile, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(UserProfile {
            id: self.id,
            name: self.name.clone(),
            email,
            address: None,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, is_admin, \
     reset_passcode_hash, reset_passcode_expires, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        Ok(user)
    }

    /// Store a reset passcode hash and its expiry for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_reset_passcode(
        &self,
        id: UserId,
        passcode_hash: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET reset_passcode_hash = $1, reset_passcode_expires = $2 \
             WHERE id = $3",
        )
        .bind(passcode_hash)
        .bind(expires)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Replace the password hash and clear the reset passcode in one write.
    ///
    /// The passcode is single use: a successful reset must leave no passcode
    /// behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn reset_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, \
             reset_passcode_hash = NULL, reset_passcode_expires = NULL \
             WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User {
            id: UserId::new(1),
            name: "Ada".to_owned(),
            email: email.to_owned(),
            password_hash: "argon2-hash".to_owned(),
            is_admin: false,
            reset_passcode_hash: None,
            reset_passcode_expires: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_from_stored_row() {
        let profile = user("ada@example.com").profile().expect("profile");
        assert_eq!(profile.id, UserId::new(1));
        assert_eq!(profile.email.as_str(), "ada@example.com");
        assert!(profile.address.is_none());
    }

    #[test]
    fn test_profile_rejects_corrupt_email() {
        let result = user("not-an-email").profile();
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }
}
