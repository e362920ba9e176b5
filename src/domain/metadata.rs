use serde::{Deserialize, Serialize};

/// Timestamp layout used in version records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Snapshot of the version state at the time of a request.
///
/// Built fresh on every request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub commit: String,
    pub branch: String,
    pub timestamp: String,
}

impl Metadata {
    /// Create a snapshot stamped with the host clock
    pub fn now(
        version: impl Into<String>,
        commit: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Metadata {
            version: version.into(),
            commit: commit.into(),
            branch: branch.into(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}
