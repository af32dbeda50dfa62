use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a meeting room. Any string chosen by the participants.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct MeetingId(String);

impl MeetingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MeetingId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for MeetingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
