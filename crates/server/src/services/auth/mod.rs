//! Authentication service.
//!
//! Password signup/login plus the passcode-based password recovery flow.
//! Passwords are hashed with Argon2id. Reset passcodes are 6-digit numeric
//! codes stored only as a SHA-256 digest with a 10-minute expiry, and are
//! single use.

mod error;
pub mod token;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use denfit_core::Email;

use crate::db::RepositoryError;
use crate::db::users::{User, UserRepository};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long a reset passcode stays valid.
const PASSCODE_TTL_MINUTES: i64 = 10;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with name, email, and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(name, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// Unknown user and wrong password collapse into the same error so the
    /// response cannot be used to probe for accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }

    /// Begin password recovery for an email address.
    ///
    /// Returns the user and the plain passcode when the account exists so the
    /// caller can dispatch it, and `None` otherwise. The caller must respond
    /// identically in both cases.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn start_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, AuthError> {
        let Ok(email) = Email::parse(email) else {
            // A malformed address can't name an account; same outward result.
            return Ok(None);
        };

        let Some(user) = self.users.get_by_email(&email).await? else {
            return Ok(None);
        };

        let passcode = generate_passcode();
        let expires = Utc::now() + Duration::minutes(PASSCODE_TTL_MINUTES);
        self.users
            .set_reset_passcode(user.id, &hash_passcode(&passcode), expires)
            .await?;

        Ok(Some((user, passcode)))
    }

    /// Check a passcode without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPasscode` for an unknown account, a wrong
    /// code, or one past its expiry window.
    pub async fn verify_passcode(&self, email: &str, passcode: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidPasscode)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidPasscode)?;

        check_stored_passcode(
            user.reset_passcode_hash.as_deref(),
            user.reset_passcode_expires,
            passcode,
            Utc::now(),
        )?;

        Ok(user)
    }

    /// Complete password recovery: verify the passcode, install the new
    /// password, and clear the passcode (single use).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPasscode` if the code doesn't check out.
    /// Returns `AuthError::WeakPassword` if the new password is too short.
    pub async fn reset_password(
        &self,
        email: &str,
        passcode: &str,
        new_password: &str,
    ) -> Result<User, AuthError> {
        let user = self.verify_passcode(email, passcode).await?;

        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;
        self.users.reset_password(user.id, &password_hash).await?;

        Ok(user)
    }
}

/// Compare a submitted passcode against the stored digest and expiry.
fn check_stored_passcode(
    stored_hash: Option<&str>,
    expires: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    let (Some(stored_hash), Some(expires)) = (stored_hash, expires) else {
        return Err(AuthError::InvalidPasscode);
    };
    if now > expires {
        return Err(AuthError::InvalidPasscode);
    }
    if hash_passcode(submitted) != stored_hash {
        return Err(AuthError::InvalidPasscode);
    }
    Ok(())
}

/// Generate a 6-digit reset passcode.
#[must_use]
pub fn generate_passcode() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

/// SHA-256 digest of a passcode, hex-encoded. The plain code is never stored.
#[must_use]
pub fn hash_passcode(passcode: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(passcode.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
