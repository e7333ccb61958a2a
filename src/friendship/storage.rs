//! `SQLite` storage for friendship edges.
//!
//! This module owns every directed relationship record. Reads and writes
//! go through an [`EdgeStore`] handle bound to one open transaction, so a
//! caller can compose several edge operations into a single atomic unit:
//!
//! - [`FriendshipStorage::write`] runs a closure inside `BEGIN IMMEDIATE`,
//!   which takes the database write lock before the first read. Concurrent
//!   read-modify-write sequences on the same pair therefore serialize.
//! - [`FriendshipStorage::read`] runs a closure inside a deferred
//!   transaction, so every query in it observes one snapshot.
//!
//! The store also carries a minimal `users` table standing in for the
//! user-management subsystem; profiles and precondition checks read it.

// SQLite operations need to hold the lock for the duration of the operation.
#![allow(clippy::significant_drop_tightening)]

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::error::{FriendshipError, Result};
use super::types::{FriendshipEdge, FriendshipStatus, User, UserId};

/// `SQLite`-based storage for friendship data.
///
/// Thread-safe wrapper around a single `SQLite` connection. Several
/// instances may open the same database file; the transaction boundary is
/// what keeps them consistent.
pub struct FriendshipStorage {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for FriendshipStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FriendshipStorage").finish_non_exhaustive()
    }
}

impl FriendshipStorage {
    /// Opens (or creates) the database at the given path.
    ///
    /// File databases are switched to WAL journaling so that snapshot
    /// readers don't block the writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        log::info!(
            "Opened friendship store at {} (journal_mode={journal_mode})",
            path.display()
        );

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    /// Creates an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            FriendshipError::StorageUnavailable(format!("Failed to acquire database lock: {e}"))
        })
    }

    /// Initializes the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            -- Stand-in for the user-management subsystem
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                full_name TEXT NOT NULL,
                phone_number TEXT
            );

            -- Directed relationship edges (user_id -> friend_user_id)
            CREATE TABLE IF NOT EXISTS friendships (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                friend_user_id INTEGER NOT NULL,
                status TEXT NOT NULL
                    CHECK (status IN ('requested', 'accepted', 'declined')),
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE (user_id, friend_user_id),
                CHECK (user_id <> friend_user_id)
            );

            -- Mutual-friend self-join probes by shared target
            CREATE INDEX IF NOT EXISTS idx_friendships_target_status
                ON friendships (friend_user_id, status);
            ",
        )?;

        Ok(())
    }

    // ==================== Transaction Scopes ====================

    /// Runs `f` inside an immediate (write-locked) transaction.
    ///
    /// The transaction commits if `f` returns `Ok` and rolls back
    /// otherwise, so the store never holds a half-applied change.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a storage error if the
    /// transaction cannot be opened or committed.
    pub fn write<T>(&self, f: impl FnOnce(&EdgeStore<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&EdgeStore { conn: &tx })?;
        tx.commit()?;
        Ok(value)
    }

    /// Runs `f` inside a read transaction.
    ///
    /// All queries issued by `f` observe the same committed snapshot.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a storage error if the
    /// transaction cannot be opened.
    pub fn read<T>(&self, f: impl FnOnce(&EdgeStore<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let value = f(&EdgeStore { conn: &tx })?;
        tx.commit()?;
        Ok(value)
    }

    // ==================== Single-Statement Helpers ====================

    /// Retrieves the edge `owner -> target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_edge(&self, owner: UserId, target: UserId) -> Result<Option<FriendshipEdge>> {
        self.read(|store| store.get_edge(owner, target))
    }

    /// Saves a user record, replacing any existing record with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_user(&self, user: &User) -> Result<()> {
        self.write(|store| store.save_user(user))
    }

    /// Retrieves a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.read(|store| store.get_user(id))
    }
}

/// Edge operations bound to one open transaction.
///
/// Obtained from [`FriendshipStorage::write`] or [`FriendshipStorage::read`].
pub struct EdgeStore<'c> {
    pub(super) conn: &'c Connection,
}

impl EdgeStore<'_> {
    // ==================== Edge Operations ====================

    /// Retrieves the edge `owner -> target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the stored
    /// status is unknown.
    pub fn get_edge(&self, owner: UserId, target: UserId) -> Result<Option<FriendshipEdge>> {
        let row = self
            .conn
            .query_row(
                r"
                SELECT status, created_at, updated_at
                FROM friendships
                WHERE user_id = ?1 AND friend_user_id = ?2
                ",
                params![owner.get(), target.get()],
                |row| {
                    let status: String = row.get(0)?;
                    let created_at: i64 = row.get(1)?;
                    let updated_at: i64 = row.get(2)?;
                    Ok((status, created_at, updated_at))
                },
            )
            .optional()?;

        let Some((status_str, created_at, updated_at)) = row else {
            return Ok(None);
        };

        let status = FriendshipStatus::parse(&status_str).ok_or_else(|| {
            FriendshipError::InvalidData(format!("Invalid friendship status: {status_str}"))
        })?;

        Ok(Some(FriendshipEdge {
            user_id: owner,
            friend_user_id: target,
            status,
            created_at,
            updated_at,
        }))
    }

    /// Inserts the edge `owner -> target`.
    ///
    /// # Errors
    ///
    /// Returns [`FriendshipError::ConstraintViolation`] if an edge for the
    /// pair already exists, or another error if the database operation fails.
    pub fn insert_edge(&self, owner: UserId, target: UserId, status: FriendshipStatus) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        self.conn.execute(
            r"
            INSERT INTO friendships (user_id, friend_user_id, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ",
            params![owner.get(), target.get(), status.as_str(), now],
        )?;

        Ok(())
    }

    /// Sets the status of the edge `owner -> target`.
    ///
    /// Returns the number of rows affected; `0` means no such edge exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_edge_status(
        &self,
        owner: UserId,
        target: UserId,
        status: FriendshipStatus,
    ) -> Result<usize> {
        let now = chrono::Utc::now().timestamp();

        let rows = self.conn.execute(
            r"
            UPDATE friendships
            SET status = ?1, updated_at = ?2
            WHERE user_id = ?3 AND friend_user_id = ?4
            ",
            params![status.as_str(), now, owner.get(), target.get()],
        )?;

        Ok(rows)
    }

    // ==================== User Operations ====================

    /// Saves a user record, replacing any existing record with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO users (id, full_name, phone_number)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                phone_number = excluded.phone_number
            ",
            params![user.id.get(), &user.full_name, &user.phone_number],
        )?;

        Ok(())
    }

    /// Retrieves a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, full_name, phone_number FROM users WHERE id = ?1",
                params![id.get()],
                |row| {
                    Ok(User {
                        id: UserId(row.get(0)?),
                        full_name: row.get(1)?,
                        phone_number: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(user)
    }

    /// Returns whether a user with the given id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_exists(&self, id: UserId) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1 LIMIT 1",
                params![id.get()],
                |_| Ok(()),
            )
            .optional()?;

        Ok(found.is_some())
    }
}
