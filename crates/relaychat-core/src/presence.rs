//! Presence list for the active room.
//!
//! Only ever replaced wholesale by `user_list` snapshots. Join/leave events
//! produce log notices but do not touch this list.

use relaychat_proto::{User, UserId};

/// Users currently present, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presence {
    users: Vec<User>,
}

impl Presence {
    /// Create an empty presence list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a snapshot. Returns `true` if it changed.
    pub fn replace_all(&mut self, users: Vec<User>) -> bool {
        if self.users == users {
            return false;
        }
        self.users = users;
        true
    }

    /// Users in snapshot order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Look up a user by display name.
    pub fn find_by_name(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Look up a user by id.
    pub fn find(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// Number of users present.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// True if nobody is present.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_with_same_snapshot_is_noop() {
        let mut presence = Presence::new();
        let snapshot = vec![User::new(1, "alice"), User::new(2, "bob")];

        assert!(presence.replace_all(snapshot.clone()));
        assert!(!presence.replace_all(snapshot));
        assert_eq!(presence.len(), 2);
    }

    #[test]
    fn lookup() {
        let mut presence = Presence::new();
        presence.replace_all(vec![User::new("x1", "alice")]);

        assert_eq!(presence.find_by_name("alice").map(|u| &u.id), Some(&UserId::from("x1")));
        assert!(presence.find(&UserId::from(9)).is_none());
    }
}
