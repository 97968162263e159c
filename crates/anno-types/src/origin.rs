use std::fmt;

use serde::{Deserialize, Serialize};

/// Provenance of a mutation.
///
/// The store attaches an origin to every change event so that consumers can
/// tell edits made by this client apart from edits applied on behalf of
/// someone else (a collaborator, a sync engine). Origins are routing
/// metadata only; the store never resolves conflicts with them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// Authored by this client.
    #[default]
    Local,
    /// Applied from outside (collaboration, sync, import).
    Remote,
}

impl Origin {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Local => "LOCAL",
            Self::Remote => "REMOTE",
        };
        write!(f, "{s}")
    }
}
