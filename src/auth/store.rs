//! Credential Store
//! Mission: Persist identity records with SQLite, one identity per email

use crate::auth::models::{Credential, Identity};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Identity storage with SQLite backend.
///
/// The sole writer of identity rows. Email uniqueness is enforced by the
/// UNIQUE column constraint, so of two racing registrations exactly one
/// commits and the other observes a constraint violation.
pub struct IdentityStore {
    db_path: String,
}

/// Outcome of a failed identity creation.
#[derive(Debug)]
pub enum CreateIdentityError {
    /// Another identity already holds this email.
    EmailTaken,
    Storage(anyhow::Error),
}

impl std::fmt::Display for CreateIdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateIdentityError::EmailTaken => write!(f, "Email already registered"),
            CreateIdentityError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for CreateIdentityError {}

/// Normalize an email into its stored (natural key) form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const IDENTITY_COLUMNS: &str = "id, name, email, provider, password_hash, created_at";

impl IdentityStore {
    /// Create a new identity store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        // A racing writer should wait for the lock and then hit the
        // UNIQUE constraint, not surface a busy error.
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS identities (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                provider TEXT NOT NULL,
                password_hash TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Look up an identity by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE email = ?1"
        ))?;

        let row = stmt.query_row(params![normalize_email(email)], row_to_columns);
        match row {
            Ok(columns) => Ok(Some(identity_from_columns(columns)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up an identity by id.
    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<Identity>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = ?1"
        ))?;

        let row = stmt.query_row(params![id.to_string()], row_to_columns);
        match row {
            Ok(columns) => Ok(Some(identity_from_columns(columns)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create a new identity. Fails with `EmailTaken` when the email is
    /// already registered, including when a concurrent creation wins the
    /// race between our insert and theirs.
    pub fn create(
        &self,
        name: &str,
        email: &str,
        credential: Credential,
    ) -> Result<Identity, CreateIdentityError> {
        let identity = Identity {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            credential,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.open().map_err(CreateIdentityError::Storage)?;
        let inserted = conn.execute(
            "INSERT INTO identities (id, name, email, provider, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                identity.id.to_string(),
                identity.name,
                identity.email,
                identity.credential.provider(),
                identity.credential.password_hash(),
                identity.created_at,
            ],
        );

        match inserted {
            Ok(_) => {
                info!(
                    "Created identity: {} ({})",
                    identity.email,
                    identity.credential.provider()
                );
                Ok(identity)
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(CreateIdentityError::EmailTaken)
            }
            Err(e) => Err(CreateIdentityError::Storage(
                anyhow::Error::from(e).context("Failed to insert identity"),
            )),
        }
    }
}

type IdentityColumns = (String, String, String, String, Option<String>, String);

fn row_to_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<IdentityColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn identity_from_columns(
    (id, name, email, provider, password_hash, created_at): IdentityColumns,
) -> Result<Identity> {
    let credential = Credential::from_columns(&provider, password_hash)
        .ok_or_else(|| anyhow!("Corrupt credential row for {}", email))?;

    Ok(Identity {
        id: Uuid::parse_str(&id).context("Corrupt identity id")?,
        name,
        email,
        credential,
        created_at,
    })
}
