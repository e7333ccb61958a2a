//! Aggregate queries over accepted edges.
//!
//! These are pure reads. Callers run them through
//! [`FriendshipStorage::read`](super::FriendshipStorage::read) so that every
//! join input comes from one snapshot.

use std::collections::HashMap;

use rusqlite::{params, params_from_iter, OptionalExtension};

use super::error::{FriendshipError, Result};
use super::storage::EdgeStore;
use super::types::{FriendProfile, FriendshipStatus, UserId};

const ACCEPTED: &str = FriendshipStatus::Accepted.as_str();

fn to_count(raw: i64) -> Result<u64> {
    u64::try_from(raw).map_err(|_| FriendshipError::InvalidData(format!("Negative count: {raw}")))
}

impl EdgeStore<'_> {
    /// Counts accepted edges owned by each of `users`, grouped by owner.
    ///
    /// Every requested user appears in the result; users owning no
    /// accepted edge map to `0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn total_friend_counts(&self, users: &[UserId]) -> Result<HashMap<UserId, u64>> {
        let mut counts: HashMap<UserId, u64> = users.iter().map(|&id| (id, 0)).collect();
        if users.is_empty() {
            return Ok(counts);
        }

        let placeholders = vec!["?"; users.len()].join(", ");
        let sql = format!(
            r"
            SELECT user_id, COUNT(friend_user_id) AS total_friend_count
            FROM friendships
            WHERE status = '{ACCEPTED}' AND user_id IN ({placeholders})
            GROUP BY user_id
            "
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(users.iter().map(|id| id.get())), |row| {
                let user_id: i64 = row.get(0)?;
                let total: i64 = row.get(1)?;
                Ok((user_id, total))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for (user_id, total) in rows {
            counts.insert(UserId(user_id), to_count(total)?);
        }

        Ok(counts)
    }

    /// Counts accepted edges owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn total_friend_count(&self, user: UserId) -> Result<u64> {
        let counts = self.total_friend_counts(&[user])?;
        Ok(counts.get(&user).copied().unwrap_or_default())
    }

    /// Counts users `X` such that both `a → X` and `b → X` are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn mutual_friend_count(&self, a: UserId, b: UserId) -> Result<u64> {
        let raw: i64 = self.conn.query_row(
            r"
            SELECT COUNT(f1.friend_user_id) AS mutual_friend_count
            FROM friendships AS f1
            INNER JOIN friendships AS f2 ON f1.friend_user_id = f2.friend_user_id
            WHERE f1.user_id = ?1
              AND f2.user_id = ?2
              AND f1.status = ?3
              AND f2.status = ?3
            ",
            params![a.get(), b.get(), ACCEPTED],
            |row| row.get(0),
        )?;

        to_count(raw)
    }

    /// Loads `friend`'s profile as seen by `viewer`.
    ///
    /// The profile is visible only while the edge `viewer → friend` is
    /// accepted; the predicate is part of the query itself.
    ///
    /// # Errors
    ///
    /// Returns [`FriendshipError::NotFound`] if there is no accepted edge
    /// `viewer → friend` or the friend has no user record, or another error
    /// if the database operation fails.
    pub fn friend_profile(&self, viewer: UserId, friend: UserId) -> Result<FriendProfile> {
        let row = self
            .conn
            .query_row(
                r"
                SELECT friends.id, friends.full_name, friends.phone_number,
                       COALESCE(totals.total_friend_count, 0)
                FROM users AS friends
                INNER JOIN friendships
                    ON friendships.friend_user_id = friends.id
                LEFT JOIN (
                    SELECT user_id, COUNT(friend_user_id) AS total_friend_count
                    FROM friendships
                    WHERE status = ?3
                    GROUP BY user_id
                ) AS totals
                    ON totals.user_id = friends.id
                WHERE friendships.user_id = ?1
                  AND friendships.friend_user_id = ?2
                  AND friendships.status = ?3
                LIMIT 1
                ",
                params![viewer.get(), friend.get(), ACCEPTED],
                |row| {
                    let id: i64 = row.get(0)?;
                    let full_name: String = row.get(1)?;
                    let phone_number: Option<String> = row.get(2)?;
                    let total: i64 = row.get(3)?;
                    Ok((id, full_name, phone_number, total))
                },
            )
            .optional()?;

        let Some((id, full_name, phone_number, total)) = row else {
            return Err(FriendshipError::NotFound(format!(
                "No accepted friendship from user {viewer} to user {friend}"
            )));
        };

        Ok(FriendProfile {
            id: UserId(id),
            full_name,
            phone_number,
            total_friend_count: to_count(total)?,
            mutual_friend_count: self.mutual_friend_count(viewer, friend)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friendship::error::ErrorKind;
    use crate::friendship::storage::FriendshipStorage;
    use crate::friendship::types::User;

    const A: UserId = UserId(1);
    const B: UserId = UserId(2);
    const X: UserId = UserId(3);
    const Y: UserId = UserId(4);
    const Z: UserId = UserId(5);

    fn seed(storage: &FriendshipStorage, edges: &[(UserId, UserId, FriendshipStatus)]) {
        storage
            .write(|store| {
                for &(owner, target, status) in edges {
                    store.insert_edge(owner, target, status)?;
                }
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn mutual_count_with_two_overlaps() {
        let storage = FriendshipStorage::in_memory().unwrap();
        seed(
            &storage,
            &[
                (A, X, FriendshipStatus::Accepted),
                (A, Y, FriendshipStatus::Accepted),
                (A, Z, FriendshipStatus::Accepted),
                (B, X, FriendshipStatus::Accepted),
                (B, Y, FriendshipStatus::Accepted),
            ],
        );

        let count = storage.read(|s| s.mutual_friend_count(A, B)).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn mutual_count_ignores_non_accepted_edges() {
        let storage = FriendshipStorage::in_memory().unwrap();
        seed(
            &storage,
            &[
                (A, X, FriendshipStatus::Accepted),
                (B, X, FriendshipStatus::Requested),
                (A, Y, FriendshipStatus::Declined),
                (B, Y, FriendshipStatus::Accepted),
            ],
        );

        let count = storage.read(|s| s.mutual_friend_count(A, B)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn mutual_count_is_symmetric() {
        let storage = FriendshipStorage::in_memory().unwrap();
        seed(
            &storage,
            &[
                (A, X, FriendshipStatus::Accepted),
                (B, X, FriendshipStatus::Accepted),
            ],
        );

        let (ab, ba) = storage
            .read(|s| Ok((s.mutual_friend_count(A, B)?, s.mutual_friend_count(B, A)?)))
            .unwrap();
        assert_eq!(ab, 1);
        assert_eq!(ab, ba);
    }

    #[test]
    fn total_counts_are_grouped_by_owner() {
        let storage = FriendshipStorage::in_memory().unwrap();
        seed(
            &storage,
            &[
                (A, X, FriendshipStatus::Accepted),
                (A, Y, FriendshipStatus::Accepted),
                (A, Z, FriendshipStatus::Requested),
                (B, X, FriendshipStatus::Accepted),
            ],
        );

        let counts = storage.read(|s| s.total_friend_counts(&[A, B, Z])).unwrap();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[&A], 2);
        assert_eq!(counts[&B], 1);
        assert_eq!(counts[&Z], 0);
    }

    #[test]
    fn total_counts_for_no_users_is_empty() {
        let storage = FriendshipStorage::in_memory().unwrap();
        let counts = storage.read(|s| s.total_friend_counts(&[])).unwrap();
        assert!(counts.is_empty());
    }

    #[test]
    fn total_count_single_user() {
        let storage = FriendshipStorage::in_memory().unwrap();
        seed(&storage, &[(X, A, FriendshipStatus::Accepted)]);

        assert_eq!(storage.read(|s| s.total_friend_count(X)).unwrap(), 1);
        assert_eq!(storage.read(|s| s.total_friend_count(A)).unwrap(), 0);
    }

    #[test]
    fn profile_requires_accepted_edge_from_viewer() {
        let storage = FriendshipStorage::in_memory().unwrap();
        storage.save_user(&User::new(B, "Bob")).unwrap();
        seed(
            &storage,
            &[
                (A, B, FriendshipStatus::Requested),
                (B, A, FriendshipStatus::Accepted),
            ],
        );

        let err = storage.read(|s| s.friend_profile(A, B)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn profile_includes_counts() {
        let storage = FriendshipStorage::in_memory().unwrap();
        storage
            .save_user(&User::new(B, "Bob").with_phone_number("+15550002"))
            .unwrap();
        seed(
            &storage,
            &[
                (A, B, FriendshipStatus::Accepted),
                (B, A, FriendshipStatus::Accepted),
                (A, X, FriendshipStatus::Accepted),
                (B, X, FriendshipStatus::Accepted),
                (B, Y, FriendshipStatus::Accepted),
            ],
        );

        let profile = storage.read(|s| s.friend_profile(A, B)).unwrap();
        assert_eq!(profile.id, B);
        assert_eq!(profile.full_name, "Bob");
        assert_eq!(profile.phone_number.as_deref(), Some("+15550002"));
        assert_eq!(profile.total_friend_count, 3);
        assert_eq!(profile.mutual_friend_count, 1);
    }

    #[test]
    fn profile_of_friend_without_accepted_edges_has_zero_total() {
        let storage = FriendshipStorage::in_memory().unwrap();
        storage.save_user(&User::new(B, "Bob")).unwrap();
        seed(&storage, &[(A, B, FriendshipStatus::Accepted)]);

        let profile = storage.read(|s| s.friend_profile(A, B)).unwrap();
        assert_eq!(profile.total_friend_count, 0);
        assert_eq!(profile.mutual_friend_count, 0);
    }
}
