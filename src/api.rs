//! Caller-facing API.
//!
//! [`FriendshipCore`] is the entry point a transport layer talks to. Each
//! action takes the caller's [`Session`], runs the matching precondition
//! from [`guard`](crate::friendship::guard), then hands over to the
//! [`FriendshipManager`].

use crate::config::StorageConfig;
use crate::friendship::guard::{self, Session};
use crate::friendship::{
    ActionOutcome, FriendProfile, FriendshipManager, FriendshipStorage, Result, User, UserId,
};

/// Core interface for friendship functionality.
///
/// Cheap to share across threads behind an `Arc`; several instances may
/// also point at the same database file.
///
/// # Examples
///
/// ```no_run
/// use friendship_core::{FriendshipCore, Session, StorageConfig, UserId};
///
/// let core = FriendshipCore::open(&StorageConfig::new("/data/friends"))?;
/// let outcome = core.send_request(&Session::new(1), UserId(2))?;
/// println!("{}", outcome.message);
/// # Ok::<(), friendship_core::FriendshipError>(())
/// ```
#[derive(Debug)]
pub struct FriendshipCore {
    manager: FriendshipManager,
}

impl FriendshipCore {
    /// Opens the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be created or opened.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        Ok(Self {
            manager: FriendshipManager::with_config(config)?,
        })
    }

    /// Creates a core over an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be initialized.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            manager: FriendshipManager::from_storage(FriendshipStorage::in_memory()?),
        })
    }

    /// Returns the underlying manager.
    #[must_use]
    pub const fn manager(&self) -> &FriendshipManager {
        &self.manager
    }

    fn storage(&self) -> &FriendshipStorage {
        self.manager.storage()
    }

    /// Registers or updates a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_user(&self, user: &User) -> Result<()> {
        self.storage().save_user(user)
    }

    /// Sends a friendship request from the session's user to `target`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `target` doesn't exist, `InvalidTransition`
    /// if a request is already pending or accepted.
    pub fn send_request(&self, session: &Session, target: UserId) -> Result<ActionOutcome> {
        guard::can_send(self.storage(), session, target)?;
        self.manager.send_request(session.actor_id, target)
    }

    /// Accepts `requester`'s pending request to the session's user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no pending request from `requester`.
    pub fn accept_request(&self, session: &Session, requester: UserId) -> Result<ActionOutcome> {
        guard::can_answer(self.storage(), session, requester)?;
        self.manager.accept_request(session.actor_id, requester)
    }

    /// Declines `requester`'s pending request to the session's user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no pending request from `requester`.
    pub fn decline_request(&self, session: &Session, requester: UserId) -> Result<ActionOutcome> {
        guard::can_answer(self.storage(), session, requester)?;
        self.manager.decline_request(session.actor_id, requester)
    }

    /// Loads `friend`'s profile as seen by the session's user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` unless the session's user has accepted `friend`.
    pub fn get_friend_profile(&self, session: &Session, friend: UserId) -> Result<FriendProfile> {
        self.manager.get_friend_profile(session.actor_id, friend)
    }
}
