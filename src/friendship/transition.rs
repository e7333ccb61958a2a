//! Relationship state machine.
//!
//! Pure transition logic: given the current status of the relevant
//! directed edges, decide which writes an action performs or why it is
//! rejected. Nothing here touches storage; the manager runs these
//! decisions inside a transaction.
//!
//! | Action            | Edge read                  | Write                                   |
//! |-------------------|----------------------------|-----------------------------------------|
//! | send(A, B)        | A→B absent                 | insert A→B `requested`                  |
//! | send(A, B)        | A→B `declined`             | update A→B `requested`                  |
//! | send(A, B)        | A→B `requested`/`accepted` | rejected                                |
//! | accept(B, A)      | A→B `requested`            | A→B `accepted`, B→A insert/update `accepted` |
//! | decline(B, A)     | A→B `requested`            | A→B `declined`                          |

use std::fmt;

use super::types::FriendshipStatus;

/// A mutating action on a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipAction {
    /// Actor asks the target to be friends.
    Send,
    /// Actor accepts a pending request from the requester.
    Accept,
    /// Actor turns down a pending request from the requester.
    Decline,
}

impl fmt::Display for FriendshipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Send => "send",
            Self::Accept => "accept",
            Self::Decline => "decline",
        })
    }
}

/// A single write against one directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWrite {
    /// No edge exists yet; create it with this status.
    Insert(FriendshipStatus),
    /// The edge exists; set it to this status.
    Update(FriendshipStatus),
}

impl EdgeWrite {
    /// Status the edge will have after the write.
    #[must_use]
    pub const fn status(self) -> FriendshipStatus {
        match self {
            Self::Insert(status) | Self::Update(status) => status,
        }
    }

    const fn accepted(existing: Option<FriendshipStatus>) -> Self {
        match existing {
            Some(_) => Self::Update(FriendshipStatus::Accepted),
            None => Self::Insert(FriendshipStatus::Accepted),
        }
    }
}

/// Writes performed by an accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptPlan {
    /// Write to the requester's edge (requester → actor).
    pub request_edge: EdgeWrite,
    /// Write to the actor's own edge (actor → requester).
    pub own_edge: EdgeWrite,
}

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A send found the actor's edge already `requested` or `accepted`.
    AlreadyActive(FriendshipStatus),
    /// An accept or decline found no `requested` edge from the requester.
    NoPendingRequest(Option<FriendshipStatus>),
}

/// Plans `send(actor, target)` given the status of edge actor → target.
///
/// # Errors
///
/// Returns [`Rejection::AlreadyActive`] if the edge is `requested` or
/// `accepted`.
pub const fn plan_send(existing: Option<FriendshipStatus>) -> Result<EdgeWrite, Rejection> {
    match existing {
        None => Ok(EdgeWrite::Insert(FriendshipStatus::Requested)),
        Some(FriendshipStatus::Declined) => Ok(EdgeWrite::Update(FriendshipStatus::Requested)),
        Some(status @ (FriendshipStatus::Requested | FriendshipStatus::Accepted)) => {
            Err(Rejection::AlreadyActive(status))
        }
    }
}

/// Plans `accept(actor, requester)`.
///
/// `request` is the status of edge requester → actor, `own` the status of
/// edge actor → requester. Whatever `own` holds, both edges end `accepted`.
///
/// # Errors
///
/// Returns [`Rejection::NoPendingRequest`] unless `request` is `requested`.
pub const fn plan_accept(
    request: Option<FriendshipStatus>,
    own: Option<FriendshipStatus>,
) -> Result<AcceptPlan, Rejection> {
    match request {
        Some(FriendshipStatus::Requested) => Ok(AcceptPlan {
            request_edge: EdgeWrite::Update(FriendshipStatus::Accepted),
            own_edge: EdgeWrite::accepted(own),
        }),
        other => Err(Rejection::NoPendingRequest(other)),
    }
}

/// Plans `decline(actor, requester)` given the status of edge
/// requester → actor. The actor's own edge is never touched.
///
/// # Errors
///
/// Returns [`Rejection::NoPendingRequest`] unless `request` is `requested`.
pub const fn plan_decline(request: Option<FriendshipStatus>) -> Result<EdgeWrite, Rejection> {
    match request {
        Some(FriendshipStatus::Requested) => Ok(EdgeWrite::Update(FriendshipStatus::Declined)),
        other => Err(Rejection::NoPendingRequest(other)),
    }
}
