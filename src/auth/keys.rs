//! The authorized key set.

use std::fmt;
use subtle::{Choice, ConstantTimeEq};

use crate::error::{Result, ServerError};

/// Keys accepted by the server, fixed at startup.
///
/// An empty set means open mode: every request is authorized, including
/// requests that carry no credential at all. Only an empty input produces
/// an empty set.
#[derive(Clone, Default)]
pub struct AuthorizedKeySet {
    keys: Vec<String>,
}

impl AuthorizedKeySet {
    /// Build a key set from configured keys, stored exactly as given.
    ///
    /// Blank keys, keys with surrounding whitespace and duplicates are
    /// rejected.
    pub fn new<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: Vec<String> = Vec::new();
        for key in keys {
            let key: String = key.into();
            if key.trim().is_empty() {
                return Err(ServerError::Config(
                    "Authorized keys cannot be blank".to_string(),
                ));
            }
            if key.trim() != key {
                return Err(ServerError::Config(
                    "Authorized keys cannot carry leading or trailing whitespace".to_string(),
                ));
            }
            if set.contains(&key) {
                return Err(ServerError::Config(
                    "Authorized keys must be unique".to_string(),
                ));
            }
            set.push(key);
        }

        Ok(Self { keys: set })
    }

    /// Key set that authorizes everything
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check a candidate against the set.
    ///
    /// Every configured key is compared in constant time, and the loop never
    /// exits early on a match.
    pub fn validate(&self, candidate: Option<&str>) -> bool {
        if self.is_open() {
            return true;
        }

        let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
            return false;
        };

        self.keys
            .iter()
            .fold(Choice::from(0u8), |matched, key| {
                matched | key.as_bytes().ct_eq(candidate.as_bytes())
            })
            .into()
    }
}

impl fmt::Debug for AuthorizedKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedKeySet")
            .field("len", &self.keys.len())
            .finish()
    }
}
