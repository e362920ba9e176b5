use crate::domain::version::Version;

/// Prerelease suffix removed when a prerelease tag is promoted
const PROMOTION_SUFFIX: &str = "-pre";

/// Represents a git tag and the version it parses to, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub version: Option<Version>,
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let version = Version::parse(&name);
        Tag { name, version }
    }

    /// Explicit patch and no prerelease marker (`v1.2.3`)
    pub fn is_release(&self) -> bool {
        self.version.as_ref().is_some_and(Version::is_release)
    }

    /// `major.minor` only (`v1.2`, `v1.2-pre`)
    pub fn is_floating(&self) -> bool {
        self.version.as_ref().is_some_and(Version::is_floating)
    }

    /// Tag name with a trailing `-pre` marker removed (`v1.2-pre` -> `v1.2`)
    pub fn promoted_name(&self) -> &str {
        self.name
            .strip_suffix(PROMOTION_SUFFIX)
            .unwrap_or(&self.name)
    }
}

/// Normalize a version string to a `v`-prefixed tag name
pub fn tag_name_for(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{}", version)
    }
}

/// Strip a leading `v` from a tag name
pub fn strip_v(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}
