//! Core types for friendship management.
//!
//! A friendship between two users is stored as up to two directed edges,
//! one owned by each side. This module defines the edge record, its
//! status, and the values handed back to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque user identifier.
///
/// Users are owned by a separate user-management subsystem; this crate
/// only references them by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Returns the raw integer id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a directed friendship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    /// The owner asked the target to be friends.
    Requested,
    /// The owner considers the target a friend.
    Accepted,
    /// The target turned the owner's request down.
    Declined,
}

impl FriendshipStatus {
    /// Converts to string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "requested" => Some(Self::Requested),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relationship record `owner -> target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendshipEdge {
    /// User who owns this direction of the relationship.
    pub user_id: UserId,
    /// User the edge points at.
    pub friend_user_id: UserId,
    /// Current status.
    pub status: FriendshipStatus,
    /// When the edge was first created (Unix timestamp).
    pub created_at: i64,
    /// When the status last changed (Unix timestamp).
    pub updated_at: i64,
}

/// A user record as known to the user registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id.
    pub id: UserId,
    /// Full display name.
    pub full_name: String,
    /// Phone number, if the user shared one.
    pub phone_number: Option<String>,
}

impl User {
    /// Creates a user without a phone number.
    #[must_use]
    pub fn new(id: impl Into<UserId>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            phone_number: None,
        }
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }
}

/// A friend's profile as seen by a viewer with an accepted edge to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendProfile {
    /// Friend's user id.
    pub id: UserId,
    /// Friend's full name.
    pub full_name: String,
    /// Friend's phone number.
    pub phone_number: Option<String>,
    /// Number of accepted edges owned by the friend.
    pub total_friend_count: u64,
    /// Number of users both the viewer and the friend have accepted.
    pub mutual_friend_count: u64,
}

/// Result of a successful mutating action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    /// Human-readable confirmation.
    pub message: String,
}

impl ActionOutcome {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_as_str() {
        assert_eq!(FriendshipStatus::Requested.as_str(), "requested");
        assert_eq!(FriendshipStatus::Accepted.as_str(), "accepted");
        assert_eq!(FriendshipStatus::Declined.as_str(), "declined");
    }

    #[test]
    fn status_parse() {
        assert_eq!(
            FriendshipStatus::parse("requested"),
            Some(FriendshipStatus::Requested)
        );
        assert_eq!(
            FriendshipStatus::parse("accepted"),
            Some(FriendshipStatus::Accepted)
        );
        assert_eq!(
            FriendshipStatus::parse("declined"),
            Some(FriendshipStatus::Declined)
        );
        assert_eq!(FriendshipStatus::parse("Accepted"), None);
        assert_eq!(FriendshipStatus::parse(""), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&FriendshipStatus::Declined).unwrap();
        assert_eq!(json, "\"declined\"");
    }

    #[test]
    fn user_id_is_transparent_in_json() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(UserId::from(42).get(), 42);
        assert_eq!(UserId(42).to_string(), "42");
    }

    #[test]
    fn user_builder() {
        let user = User::new(3, "Carol").with_phone_number("+15550100");
        assert_eq!(user.id, UserId(3));
        assert_eq!(user.full_name, "Carol");
        assert_eq!(user.phone_number.as_deref(), Some("+15550100"));
    }

    #[test]
    fn friend_profile_uses_camel_case_fields() {
        let profile = FriendProfile {
            id: UserId(2),
            full_name: "Bob".to_string(),
            phone_number: None,
            total_friend_count: 3,
            mutual_friend_count: 1,
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["fullName"], "Bob");
        assert_eq!(value["totalFriendCount"], 3);
        assert_eq!(value["mutualFriendCount"], 1);
        assert!(value["phoneNumber"].is_null());
    }
}
