//! Reusable test helpers for friendship integration tests.
//!
//! Every helper works against a real `SQLite` file in its own temporary
//! directory. Several `FriendshipCore` instances opened on the same
//! directory behave like separate server processes sharing one database.

#![allow(dead_code)]

use std::time::Duration;

use friendship_core::{FriendshipCore, StorageConfig, User, UserId};
use tempfile::TempDir;

pub const ALICE: UserId = UserId(1);
pub const BOB: UserId = UserId(2);
pub const CAROL: UserId = UserId(3);
pub const DAVE: UserId = UserId(4);
pub const ERIN: UserId = UserId(5);

/// Installs a test logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A temporary data directory with the standard cast of users registered.
pub struct TestDb {
    pub dir: TempDir,
    pub config: StorageConfig,
}

impl TestDb {
    /// Creates a fresh database and registers Alice through Erin.
    pub fn new() -> Self {
        init_logging();
        let dir = tempfile::tempdir().expect("should create temp dir");
        let config = StorageConfig::new(dir.path()).with_busy_timeout(Duration::from_secs(10));

        let core = FriendshipCore::open(&config).expect("should open store");
        for (id, name) in [
            (ALICE, "Alice"),
            (BOB, "Bob"),
            (CAROL, "Carol"),
            (DAVE, "Dave"),
            (ERIN, "Erin"),
        ] {
            core.save_user(&User::new(id, name)).expect("should save user");
        }

        Self { dir, config }
    }

    /// Opens a new, independent connection to the database.
    pub fn open(&self) -> FriendshipCore {
        FriendshipCore::open(&self.config).expect("should open store")
    }
}

/// Makes `a` and `b` mutual friends through the public API.
pub fn befriend(core: &FriendshipCore, a: UserId, b: UserId) {
    use friendship_core::Session;

    core.send_request(&Session::new(a), b)
        .expect("should send request");
    core.accept_request(&Session::new(b), a)
        .expect("should accept request");
}
