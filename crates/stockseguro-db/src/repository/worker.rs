//! # Worker Repository
//!
//! Registered workers and the email + PIN login.
//!
//! ## Login Flow
//! ```text
//! email, pin
//!    │  trim, lowercase email
//!    ▼
//! blank?  ──► MissingEmail / MissingPin
//!    │
//!    ▼
//! SELECT … WHERE lower(email) = ?
//!    │
//!    ├── no row            ──► InvalidCredentials
//!    ├── active = 0        ──► Inactive
//!    ├── argon2 mismatch   ──► InvalidCredentials
//!    ▼
//! WorkerSession { id, name, email, rut }
//! ```
//! PINs are stored as argon2 PHC strings and never leave this module.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use stockseguro_core::api::{LoginRequest, Outcome, SignedIn};
use stockseguro_core::{AuthError, Worker, WorkerSession};

/// Worker row including the PIN hash.
#[derive(FromRow)]
struct WorkerCredentials {
    id: i64,
    rut: String,
    name: String,
    email: String,
    pin_hash: String,
    active: bool,
}

/// Repository for worker accounts.
#[derive(Debug, Clone)]
pub struct WorkerRepository {
    pool: SqlitePool,
}

impl WorkerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WorkerRepository { pool }
    }

    /// Registers a worker with a hashed PIN.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the rut or the email (in any case)
    /// is already registered.
    pub async fn register(&self, rut: &str, name: &str, email: &str, pin: &str) -> DbResult<Worker> {
        let rut = rut.trim();
        let name = name.trim();
        let email = email.trim().to_lowercase();
        debug!(rut = %rut, email = %email, "Registering worker");

        let pin_hash = hash_pin(pin.trim())?;

        let result = sqlx::query(
            "INSERT INTO workers (rut, name, email, pin_hash, active) VALUES (?1, ?2, ?3, ?4, 1)",
        )
        .bind(rut)
        .bind(name)
        .bind(&email)
        .bind(&pin_hash)
        .execute(&self.pool)
        .await?;

        let worker = Worker {
            id: result.last_insert_rowid(),
            rut: rut.to_string(),
            name: name.to_string(),
            email,
            active: true,
        };
        info!(worker_id = worker.id, "Worker registered");
        Ok(worker)
    }

    pub async fn find_by_id(&self, id: i64) -> DbResult<Option<Worker>> {
        let worker = sqlx::query_as::<_, Worker>(
            "SELECT id, rut, name, email, active FROM workers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(worker)
    }

    /// Case-insensitive lookup.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<Worker>> {
        let worker = sqlx::query_as::<_, Worker>(
            "SELECT id, rut, name, email, active FROM workers WHERE lower(email) = ?1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(worker)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Enables or disables login for a worker. Returns affected rows.
    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<u64> {
        let result = sqlx::query("UPDATE workers SET active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// `{ ok, user }` or `{ ok: false, error, code }`.
    pub async fn login(&self, request: &LoginRequest) -> Outcome<SignedIn> {
        let result = self.authenticate(&request.email, &request.pin).await;
        Outcome::from_result(result.map(|user| SignedIn { user }))
    }

    /// Checks an email + PIN pair.
    pub async fn authenticate(&self, email: &str, pin: &str) -> Result<WorkerSession, AuthError> {
        let email = email.trim().to_lowercase();
        let pin = pin.trim();

        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }
        if pin.is_empty() {
            return Err(AuthError::MissingPin);
        }

        let row = sqlx::query_as::<_, WorkerCredentials>(
            r#"
            SELECT id, rut, name, email, pin_hash, active
            FROM workers
            WHERE lower(email) = ?1
            LIMIT 1
            "#,
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let Some(row) = row else {
            debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !row.active {
            return Err(AuthError::Inactive);
        }
        if !verify_pin(pin, &row.pin_hash) {
            debug!(worker_id = row.id, "Login with wrong PIN");
            return Err(AuthError::InvalidCredentials);
        }

        info!(worker_id = row.id, "Worker signed in");
        Ok(WorkerSession {
            id: row.id,
            name: row.name,
            email: row.email,
            rut: row.rut,
        })
    }
}

/// Hashes a PIN for storage.
fn hash_pin(pin: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| DbError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// A malformed stored hash counts as a mismatch.
fn verify_pin(pin: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(pin.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
