//! Friendship management between users.
//!
//! A friendship between A and B is stored as two independently owned
//! directed edges, A→B and B→A, each with its own status. A request is a
//! one-sided claim; acceptance is the point of mutual commitment, and is
//! the only action that writes both edges.
//!
//! # Architecture
//!
//! ```text
//! FriendshipManager (transaction orchestration)
//!     ├── transition (pure state machine)
//!     └── FriendshipStorage (SQLite edge store)
//!             └── aggregate queries (total / mutual counts, profiles)
//! ```
//!
//! # Types
//!
//! - [`FriendshipEdge`]: A directed relationship record
//! - [`FriendshipStatus`]: `requested`, `accepted` or `declined`
//! - [`FriendProfile`]: A friend's profile with aggregate counts
//! - [`Session`]: The acting user

mod aggregate;
mod error;
pub mod guard;
mod manager;
mod storage;
pub mod transition;
pub mod types;

pub use error::{ErrorKind, FriendshipError, Result};
pub use guard::Session;
pub use manager::{
    FriendshipManager, ALREADY_ACTIVE, REQUEST_ACCEPTED, REQUEST_DECLINED, REQUEST_SENT,
};
pub use storage::{EdgeStore, FriendshipStorage};
pub use transition::FriendshipAction;
pub use types::{ActionOutcome, FriendProfile, FriendshipEdge, FriendshipStatus, User, UserId};
