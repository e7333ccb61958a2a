//! Transaction orchestration for friendship actions.
//!
//! The [`FriendshipManager`] wraps every mutating action in one immediate
//! transaction: read the relevant edges, ask the state machine for the
//! transition, apply the writes, commit. Any failure rolls the whole
//! transaction back, so after `accept` commits both directed edges are
//! `accepted` and no reader ever sees only one of them.

use std::path::Path;

use super::error::{FriendshipError, Result};
use super::storage::{EdgeStore, FriendshipStorage};
use super::transition::{self, EdgeWrite, FriendshipAction, Rejection};
use super::types::{ActionOutcome, FriendProfile, FriendshipStatus, UserId};
use crate::config::StorageConfig;

/// Confirmation returned by a successful send.
pub const REQUEST_SENT: &str = "Friendship request sent successfully";
/// Confirmation returned by a successful accept.
pub const REQUEST_ACCEPTED: &str = "Friendship accepted successfully";
/// Confirmation returned by a successful decline.
pub const REQUEST_DECLINED: &str = "Friendship request declined successfully";
/// Message for a send against a pending or accepted edge.
pub const ALREADY_ACTIVE: &str =
    "A friendship request is already in progress or has been accepted.";

/// High-level API for friendship state.
///
/// Holds no in-memory state besides its store; every decision is made
/// against what the current transaction reads.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use friendship_core::friendship::{FriendshipManager, UserId};
///
/// let manager = FriendshipManager::new(Path::new("/data/friends"))?;
/// manager.send_request(UserId(1), UserId(2))?;
/// # Ok::<(), friendship_core::friendship::FriendshipError>(())
/// ```
#[derive(Debug)]
pub struct FriendshipManager {
    storage: FriendshipStorage,
}

impl FriendshipManager {
    /// Creates a manager whose database lives in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn new(data_dir: &Path) -> Result<Self> {
        Self::with_config(&StorageConfig::new(data_dir))
    }

    /// Creates a manager from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn with_config(config: &StorageConfig) -> Result<Self> {
        Ok(Self {
            storage: config.create_storage()?,
        })
    }

    /// Creates a manager over an already opened store.
    #[must_use]
    pub const fn from_storage(storage: FriendshipStorage) -> Self {
        Self { storage }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn storage(&self) -> &FriendshipStorage {
        &self.storage
    }

    // ==================== Mutating Actions ====================

    /// Sends a friendship request from `actor` to `target`.
    ///
    /// Creates edge `actor → target` as `requested`, or resurrects it from
    /// `declined`. The reverse edge is never touched.
    ///
    /// # Errors
    ///
    /// - [`FriendshipError::InvalidTransition`] if `actor == target`, or the
    ///   edge is already `requested` or `accepted` (including when a
    ///   concurrent send won the race to insert it).
    /// - [`FriendshipError::StorageUnavailable`] on transient storage failure.
    pub fn send_request(&self, actor: UserId, target: UserId) -> Result<ActionOutcome> {
        ensure_distinct(actor, target)?;

        let written = self.storage.write(|store| {
            let existing = store.get_edge(actor, target)?.map(|edge| edge.status);
            let write = transition::plan_send(existing)
                .map_err(|rejection| rejected(FriendshipAction::Send, actor, target, rejection))?;
            apply(store, actor, target, write)?;
            Ok(write)
        });

        let write = written.map_err(|err| match err {
            FriendshipError::ConstraintViolation(detail) => {
                log::warn!(
                    "Concurrent send {actor} -> {target} lost the insert race: {detail}"
                );
                FriendshipError::InvalidTransition(ALREADY_ACTIVE.to_string())
            }
            other => other,
        })?;

        log::debug!("send {actor} -> {target}: {write:?}");
        Ok(ActionOutcome::new(REQUEST_SENT))
    }

    /// Accepts the pending request `requester → actor`.
    ///
    /// In one transaction, sets the requester's edge to `accepted` and
    /// inserts or updates the actor's own edge to `accepted`.
    ///
    /// # Errors
    ///
    /// - [`FriendshipError::NotFound`] if there is no `requested` edge
    ///   `requester → actor` (including when a concurrent accept already
    ///   consumed it).
    /// - [`FriendshipError::InvalidTransition`] if `actor == requester`.
    /// - [`FriendshipError::StorageUnavailable`] on transient storage failure.
    pub fn accept_request(&self, actor: UserId, requester: UserId) -> Result<ActionOutcome> {
        ensure_distinct(actor, requester)?;

        let plan = self
            .storage
            .write(|store| {
                let request = store.get_edge(requester, actor)?.map(|edge| edge.status);
                let own = store.get_edge(actor, requester)?.map(|edge| edge.status);
                let plan = transition::plan_accept(request, own).map_err(|rejection| {
                    rejected(FriendshipAction::Accept, actor, requester, rejection)
                })?;

                apply(store, requester, actor, plan.request_edge)?;
                apply(store, actor, requester, plan.own_edge)?;
                Ok(plan)
            })
            .map_err(|err| match err {
                FriendshipError::ConstraintViolation(detail) => {
                    log::warn!(
                        "Concurrent accept {actor} <- {requester} hit a uniqueness race: {detail}"
                    );
                    FriendshipError::InvalidTransition(format!(
                        "Friendship between users {actor} and {requester} changed concurrently"
                    ))
                }
                other => other,
            })?;

        log::debug!("accept {actor} <- {requester}: {plan:?}");
        Ok(ActionOutcome::new(REQUEST_ACCEPTED))
    }

    /// Declines the pending request `requester → actor`.
    ///
    /// Only the requester's edge changes; the actor's own edge stays as it
    /// was (usually absent).
    ///
    /// # Errors
    ///
    /// - [`FriendshipError::NotFound`] if there is no `requested` edge
    ///   `requester → actor`.
    /// - [`FriendshipError::InvalidTransition`] if `actor == requester`.
    /// - [`FriendshipError::StorageUnavailable`] on transient storage failure.
    pub fn decline_request(&self, actor: UserId, requester: UserId) -> Result<ActionOutcome> {
        ensure_distinct(actor, requester)?;

        let write = self.storage.write(|store| {
            let request = store.get_edge(requester, actor)?.map(|edge| edge.status);
            let write = transition::plan_decline(request).map_err(|rejection| {
                rejected(FriendshipAction::Decline, actor, requester, rejection)
            })?;
            apply(store, requester, actor, write)?;
            Ok(write)
        })?;

        log::debug!("decline {actor} <- {requester}: {write:?}");
        Ok(ActionOutcome::new(REQUEST_DECLINED))
    }

    // ==================== Aggregate Queries ====================

    /// Loads `friend`'s profile with total and mutual friend counts.
    ///
    /// All values come from one read snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FriendshipError::NotFound`] unless edge `viewer → friend`
    /// is `accepted`.
    pub fn get_friend_profile(&self, viewer: UserId, friend: UserId) -> Result<FriendProfile> {
        self.storage.read(|store| store.friend_profile(viewer, friend))
    }

    /// Counts users both `a` and `b` have an accepted edge to.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn mutual_friend_count(&self, a: UserId, b: UserId) -> Result<u64> {
        self.storage.read(|store| store.mutual_friend_count(a, b))
    }

    /// Counts accepted edges owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn total_friend_count(&self, user: UserId) -> Result<u64> {
        self.storage.read(|store| store.total_friend_count(user))
    }

    /// Returns the status of edge `owner → target`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn edge_status(&self, owner: UserId, target: UserId) -> Result<Option<FriendshipStatus>> {
        Ok(self.storage.get_edge(owner, target)?.map(|edge| edge.status))
    }
}

fn ensure_distinct(actor: UserId, other: UserId) -> Result<()> {
    if actor == other {
        return Err(FriendshipError::InvalidTransition(format!(
            "User {actor} cannot befriend themselves"
        )));
    }
    Ok(())
}

/// Applies one planned write to edge `owner → target`.
fn apply(store: &EdgeStore<'_>, owner: UserId, target: UserId, write: EdgeWrite) -> Result<()> {
    match write {
        EdgeWrite::Insert(status) => store.insert_edge(owner, target, status),
        EdgeWrite::Update(status) => {
            if store.update_edge_status(owner, target, status)? == 0 {
                return Err(FriendshipError::NotFound(format!(
                    "Friendship edge {owner} -> {target} disappeared during update"
                )));
            }
            Ok(())
        }
    }
}

fn rejected(
    action: FriendshipAction,
    actor: UserId,
    other: UserId,
    rejection: Rejection,
) -> FriendshipError {
    match rejection {
        Rejection::AlreadyActive(status) => {
            log::debug!("{action} {actor} -> {other} rejected: edge is {status}");
            FriendshipError::InvalidTransition(ALREADY_ACTIVE.to_string())
        }
        Rejection::NoPendingRequest(status) => {
            log::debug!("{action} {actor} <- {other} rejected: request edge is {status:?}");
            FriendshipError::NotFound(format!(
                "No pending friendship request from user {other} to user {actor}"
            ))
        }
    }
}
