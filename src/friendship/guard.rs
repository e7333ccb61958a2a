//! Preconditions checked before an action reaches the manager.
//!
//! These mirror what an authorization layer would verify for the acting
//! user: that the target of a request exists, and that there is a pending
//! request to answer. They run in their own read snapshot; the manager
//! re-validates edge state inside its write transaction.

use serde::{Deserialize, Serialize};

use super::error::{FriendshipError, Result};
use super::storage::FriendshipStorage;
use super::types::{FriendshipStatus, UserId};

/// Identity of the authenticated user performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Acting user.
    pub actor_id: UserId,
}

impl Session {
    /// Creates a session for `actor_id`.
    #[must_use]
    pub fn new(actor_id: impl Into<UserId>) -> Self {
        Self {
            actor_id: actor_id.into(),
        }
    }
}

/// Checks that `target` exists before `session` may send it a request.
///
/// # Errors
///
/// Returns [`FriendshipError::NotFound`] if the target user doesn't exist.
pub fn can_send(storage: &FriendshipStorage, _session: &Session, target: UserId) -> Result<()> {
    if storage.read(|store| store.user_exists(target))? {
        Ok(())
    } else {
        Err(FriendshipError::NotFound(format!("User {target} not found")))
    }
}

/// Checks that `requester` has a pending request to `session`'s user.
///
/// # Errors
///
/// Returns [`FriendshipError::NotFound`] unless edge
/// `requester → actor` exists with status `requested`.
pub fn can_answer(storage: &FriendshipStorage, session: &Session, requester: UserId) -> Result<()> {
    let actor = session.actor_id;
    let pending = storage
        .get_edge(requester, actor)?
        .is_some_and(|edge| edge.status == FriendshipStatus::Requested);

    if pending {
        Ok(())
    } else {
        Err(FriendshipError::NotFound(format!(
            "No pending friendship request from user {requester} to user {actor}"
        )))
    }
}
