//! Optimistic concurrency token.
//!
//! [`Version`] is an opaque value regenerated by the store on every write
//! to a mutable row. A writer presents the version it last read; the store
//! rejects the write when the row has moved on since.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque row version. Clients must treat it as an uninterpreted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Version(uuid::Uuid);

impl Version {
    /// Generates a fresh version for a write.
    #[must_use]
    pub fn next() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Wraps a version read back from the store.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Version {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<Version> for uuid::Uuid {
    fn from(version: Version) -> Self {
        version.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn next_never_repeats() {
        assert_ne!(Version::next(), Version::next());
    }

    #[test]
    fn parses_display_output() {
        let v = Version::next();
        let Ok(parsed) = v.to_string().parse::<Version>() else {
            panic!("version should parse");
        };
        assert_eq!(parsed, v);
    }
}
