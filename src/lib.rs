//! Friendship Core Library
//!
//! Bidirectional friendship relationships between users, stored as two
//! directed edges and kept consistent under concurrent mutation.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod config;
pub mod friendship;

pub use api::FriendshipCore;
pub use config::StorageConfig;
pub use friendship::{
    ActionOutcome, ErrorKind, FriendProfile, FriendshipError, FriendshipStatus, Result, Session,
    User, UserId,
};
