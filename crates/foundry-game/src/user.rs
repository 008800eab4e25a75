//! Player identity.
//!
//! A [`UserId`] is the player's name, trusted as given. The only checks are
//! the ones storage needs: the name must not be blank and must fit the
//! `user_id` column.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a user name in bytes.
pub const MAX_USER_ID_LEN: usize = 128;

/// Errors produced when constructing a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdError {
    /// The name was empty or whitespace only.
    #[error("user name must not be empty")]
    Empty,

    /// The name exceeds [`MAX_USER_ID_LEN`] bytes.
    #[error("user name is {len} bytes, maximum is {max}")]
    TooLong {
        /// Length of the rejected name in bytes.
        len: usize,
        /// The configured maximum.
        max: usize,
    },
}

/// Unique identifier of a player.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a player name.
    ///
    /// # Errors
    ///
    /// Returns [`UserIdError`] if the name is blank or too long.
    pub fn new(name: impl Into<String>) -> Result<Self, UserIdError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserIdError::Empty);
        }
        if name.len() > MAX_USER_ID_LEN {
            return Err(UserIdError::TooLong {
                len: name.len(),
                max: MAX_USER_ID_LEN,
            });
        }
        Ok(Self(name))
    }

    /// The player name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}
