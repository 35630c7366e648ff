//! Case-insensitive, case-preserving name list.

use serde::{Deserialize, Serialize};

/// Compares two chat names the way Twitch does: ignoring case.
pub fn same_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// An ordered set of player names.
///
/// Identity is case-insensitive but the first-seen casing is kept, so
/// inserting `"ana"` after `"Ana"` is a no-op and the roster still shows
/// `"Ana"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<String>);

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster, dropping case-insensitive duplicates.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster = Self::new();
        for name in names {
            roster.insert(name);
        }
        roster
    }

    /// Adds `name` unless an equal name is already present.
    ///
    /// Returns `true` if the name was added.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    /// Removes the entry matching `name` and returns its stored casing.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|n| same_name(n, name))?;
        Some(self.0.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| same_name(n, name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
