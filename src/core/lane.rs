//! Lane identifiers and the well-known lane names.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default lane for user-initiated commands.
pub const MAIN: &str = "main";
/// Lane for scheduled/cron job executions.
pub const CRON: &str = "cron";
/// Lane for delegated subagent work.
pub const SUBAGENT: &str = "subagent";
/// Lane for nested command invocations.
pub const NESTED: &str = "nested";

/// Name of an isolation domain.
///
/// Any string is a valid lane. Empty or whitespace-only names normalize to
/// [`MAIN`], so `LaneId::from("")` and `LaneId::main()` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LaneId(String);

impl LaneId {
    /// Build a lane id, normalizing blank names to the main lane.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            Self::main()
        } else {
            Self(name)
        }
    }

    /// The default lane.
    pub fn main() -> Self {
        Self(MAIN.to_owned())
    }

    /// The lane name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LaneId {
    fn default() -> Self {
        Self::main()
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LaneId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for LaneId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for LaneId {
    fn from(name: &String) -> Self {
        Self::new(name.as_str())
    }
}

impl From<&Self> for LaneId {
    fn from(lane: &Self) -> Self {
        lane.clone()
    }
}

impl From<LaneId> for String {
    fn from(lane: LaneId) -> Self {
        lane.0
    }
}

impl AsRef<str> for LaneId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LaneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
