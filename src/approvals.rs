use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("user '{0}' has already approved this bid")]
pub struct AlreadyApproved(pub String);

/// Usernames that approved a bid, in the order they voted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalSet {
    usernames: Vec<String>,
}

impl ApprovalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, username: &str) -> Result<(), AlreadyApproved> {
        if self.contains(username) {
            return Err(AlreadyApproved(username.to_string()));
        }
        self.usernames.push(username.to_string());
        Ok(())
    }

    pub fn contains(&self, username: &str) -> bool {
        self.usernames.iter().any(|existing| existing == username)
    }

    pub fn len(&self) -> usize {
        self.usernames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usernames.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.usernames
    }
}

/// Repeated names keep their first position.
impl FromIterator<String> for ApprovalSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = ApprovalSet::new();
        for username in iter {
            let _ = set.insert(&username);
        }
        set
    }
}

impl Serialize for ApprovalSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.usernames.serialize(serializer)
    }
}
