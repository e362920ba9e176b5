use crate::error::{Result, TagVersionError};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Accepted tag grammar: optional `v`, `MAJOR.MINOR`, optional `.PATCH`, optional `-PRERELEASE`.
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+)\.(\d+)(?:\.(\d+))?(?:-([A-Za-z0-9.-]+))?$")
        .expect("version pattern is valid")
});

/// Semantic version as it appears in repository tags.
///
/// Unlike a strict semver triple the patch component is optional, so a
/// floating `v1.2` marker parses to `1.2` with no patch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
    pub prerelease: Option<String>,
}

/// Version component selected for a bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPart {
    Major,
    Minor,
    Patch,
}

impl Version {
    /// Create a version without a prerelease marker
    pub fn new(major: u32, minor: u32, patch: Option<u32>) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Create a fully-qualified `major.minor.patch` version
    pub fn release(major: u32, minor: u32, patch: u32) -> Self {
        Version::new(major, minor, Some(patch))
    }

    /// Attach a prerelease marker (`1.2.3` -> `1.2.3-dev1`)
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// Parse a tag or version string.
    ///
    /// Returns `None` for anything outside the grammar, including components
    /// that overflow `u32`. Callers treat `None` as "ignore this candidate".
    ///
    /// # Example
    /// ```
    /// use git_tag_version::domain::Version;
    ///
    /// assert_eq!(Version::parse("v1.2"), Some(Version::new(1, 2, None)));
    /// assert_eq!(Version::parse("invalid"), None);
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = VERSION_RE.captures(raw)?;

        let major = captures.get(1)?.as_str().parse::<u32>().ok()?;
        let minor = captures.get(2)?.as_str().parse::<u32>().ok()?;
        let patch = match captures.get(3) {
            Some(m) => Some(m.as_str().parse::<u32>().ok()?),
            None => None,
        };
        let prerelease = captures.get(4).map(|m| m.as_str().to_string());

        Some(Version {
            major,
            minor,
            patch,
            prerelease,
        })
    }

    /// Ordering key used for "latest" selection.
    ///
    /// `None < Some(0)`, so a missing patch sorts like patch `-1`. The
    /// prerelease marker does not participate.
    pub fn precedence(&self) -> (u32, u32, Option<u32>) {
        (self.major, self.minor, self.patch)
    }

    /// Explicit patch and no prerelease marker
    pub fn is_release(&self) -> bool {
        self.patch.is_some() && self.prerelease.is_none()
    }

    /// `major.minor` only
    pub fn is_floating(&self) -> bool {
        self.patch.is_none()
    }

    /// Bump the selected component.
    ///
    /// The result never carries a prerelease and always has an explicit patch:
    /// - **Major**: `(major+1, 0, 0)`
    /// - **Minor**: `(major, minor+1, 0)`
    /// - **Patch**: `(major, minor, patch+1)`, a missing patch counting as 0
    ///
    /// Returns `None` when the bumped component would overflow `u32`.
    pub fn bump(&self, part: VersionPart) -> Option<Self> {
        match part {
            VersionPart::Major => Some(Version::release(self.major.checked_add(1)?, 0, 0)),
            VersionPart::Minor => Some(Version::release(
                self.major,
                self.minor.checked_add(1)?,
                0,
            )),
            VersionPart::Patch => self.next_patch(),
        }
    }

    /// Next fully-qualified patch release after this version, `None` on overflow
    pub fn next_patch(&self) -> Option<Self> {
        let patch = self.patch.unwrap_or(0).checked_add(1)?;
        Some(Version::release(self.major, self.minor, patch))
    }

    /// Tag name for this version (`v`-prefixed)
    pub fn to_tag_name(&self) -> String {
        format_version(
            self.major,
            self.minor,
            self.patch,
            self.prerelease.as_deref(),
            true,
        )
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_version(
            self.major,
            self.minor,
            self.patch,
            self.prerelease.as_deref(),
            false,
        ))
    }
}

impl FromStr for VersionPart {
    type Err = TagVersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "major" => Ok(VersionPart::Major),
            "minor" => Ok(VersionPart::Minor),
            "patch" => Ok(VersionPart::Patch),
            other => Err(TagVersionError::version(format!(
                "Unknown version part '{}' - expected major, minor or patch",
                other
            ))),
        }
    }
}

impl fmt::Display for VersionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPart::Major => write!(f, "major"),
            VersionPart::Minor => write!(f, "minor"),
            VersionPart::Patch => write!(f, "patch"),
        }
    }
}

/// Format version components.
///
/// `1.2`, `1.2.3`, `1.2.3-dev1`, and with `include_v` set, `v1.2.3`.
pub fn format_version(
    major: u32,
    minor: u32,
    patch: Option<u32>,
    prerelease: Option<&str>,
    include_v: bool,
) -> String {
    let mut out = String::new();
    if include_v {
        out.push('v');
    }
    out.push_str(&format!("{}.{}", major, minor));
    if let Some(patch) = patch {
        out.push_str(&format!(".{}", patch));
    }
    if let Some(pre) = prerelease {
        out.push('-');
        out.push_str(pre);
    }
    out
}

/// Bump a version string, returning the bare (`v`-less) result.
///
/// # Errors
/// Returns a version error when `current` does not parse or the bumped
/// component would overflow.
pub fn bump_version_str(current: &str, part: VersionPart) -> Result<String> {
    let version = Version::parse(current).ok_or_else(|| {
        TagVersionError::version(format!("Invalid version format: '{}'", current))
    })?;
    let bumped = version.bump(part).ok_or_else(|| {
        TagVersionError::version(format!("Cannot bump {} of '{}': out of range", part, current))
    })?;
    Ok(bumped.to_string())
}

/// Next patch release for a `major.minor` pair (`1.2` -> `1.2.1`)
pub fn next_patch_for_pair(major: u32, minor: u32) -> Version {
    Version::release(major, minor, 1)
}

/// Next patch release for a raw tag string, `None` if it does not parse
/// or its patch is already `u32::MAX`
pub fn next_patch_for_tag(tag: &str) -> Option<Version> {
    Version::parse(tag)?.next_patch()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        assert_eq!(Version::parse("1.2.3"), Some(Version::release(1, 2, 3)));
        assert_eq!(Version::parse("v1.2.3"), Some(Version::release(1, 2, 3)));
    }

    #[test]
    fn test_parse_major_minor_only() {
        assert_eq!(Version::parse("1.2"), Some(Version::new(1, 2, None)));
        assert_eq!(Version::parse("v1.2"), Some(Version::new(1, 2, None)));
    }

    #[test]
    fn test_parse_prerelease() {
        assert_eq!(
            Version::parse("1.2.3-dev1"),
            Some(Version::release(1, 2, 3).with_prerelease("dev1"))
        );
        assert_eq!(
            Version::parse("v2.0-pre"),
            Some(Version::new(2, 0, None).with_prerelease("pre"))
        );
        assert_eq!(
            Version::parse("1.0.0-rc.1-x"),
            Some(Version::release(1, 0, 0).with_prerelease("rc.1-x"))
        );
    }

    #[test]
    fn test_parse_rejects_invalid() {
        for raw in [
            "invalid",
            "",
            "v",
            "1",
            "V1.2.3",
            "1.2.3.4",
            "1.2.3-",
            "1.2.3-dev_1",
            "release-1.2.3",
            " 1.2.3",
            "99999999999.0.0",
        ] {
            assert_eq!(Version::parse(raw), None, "'{}' should not parse", raw);
        }
    }

    #[test]
    fn test_format_version() {
        assert_eq!(format_version(1, 2, Some(3), None, false), "1.2.3");
        assert_eq!(format_version(1, 2, None, None, false), "1.2");
        assert_eq!(format_version(1, 2, Some(3), Some("dev1"), false), "1.2.3-dev1");
        assert_eq!(format_version(1, 2, Some(3), None, true), "v1.2.3");
        assert_eq!(format_version(1, 2, None, Some("pre"), true), "v1.2-pre");
    }

    #[test]
    fn test_parse_format_round_trip() {
        let versions = [
            Version::new(0, 0, None),
            Version::release(1, 2, 3),
            Version::new(4, 5, None).with_prerelease("pre"),
            Version::release(10, 20, 30).with_prerelease("dev.7-b"),
        ];

        for v in versions {
            assert_eq!(Version::parse(&v.to_string()), Some(v.clone()));
            assert_eq!(Version::parse(&v.to_tag_name()), Some(v));
        }
    }

    #[test]
    fn test_bump() {
        let v = Version::release(1, 2, 3);
        assert_eq!(v.bump(VersionPart::Major), Some(Version::release(2, 0, 0)));
        assert_eq!(v.bump(VersionPart::Minor), Some(Version::release(1, 3, 0)));
        assert_eq!(v.bump(VersionPart::Patch), Some(Version::release(1, 2, 4)));
        assert_eq!(
            Version::new(1, 2, None).bump(VersionPart::Patch),
            Some(Version::release(1, 2, 1))
        );
    }

    #[test]
    fn test_bump_drops_prerelease() {
        let v = Version::release(1, 2, 3).with_prerelease("dev4");
        assert_eq!(v.bump(VersionPart::Patch).unwrap().prerelease, None);
        assert_eq!(v.bump(VersionPart::Major).unwrap().to_string(), "2.0.0");
    }

    #[test]
    fn test_bump_at_u32_max() {
        let v = Version::parse("4294967295.4294967295.4294967295").unwrap();
        assert_eq!(v.bump(VersionPart::Major), None);
        assert_eq!(v.bump(VersionPart::Minor), None);
        assert_eq!(v.bump(VersionPart::Patch), None);
        assert_eq!(
            Version::parse("4294967295.0.0").unwrap().bump(VersionPart::Minor),
            Some(Version::release(u32::MAX, 1, 0))
        );
        assert_eq!(next_patch_for_tag("v1.2.4294967295"), None);
        assert!(bump_version_str("4294967295.0.0", VersionPart::Major).is_err());
    }

    #[test]
    fn test_bump_version_str() {
        assert_eq!(bump_version_str("1.2.3", VersionPart::Major).unwrap(), "2.0.0");
        assert_eq!(bump_version_str("v1.2.3", VersionPart::Minor).unwrap(), "1.3.0");
        assert_eq!(bump_version_str("1.2", VersionPart::Patch).unwrap(), "1.2.1");
        assert!(bump_version_str("invalid", VersionPart::Patch).is_err());
    }

    #[test]
    fn test_next_patch_helpers() {
        assert_eq!(next_patch_for_pair(1, 2), Version::release(1, 2, 1));
        assert_eq!(next_patch_for_tag("v1.2.7"), Some(Version::release(1, 2, 8)));
        assert_eq!(next_patch_for_tag("nope"), None);
    }

    #[test]
    fn test_precedence_ignores_prerelease() {
        let floating = Version::new(1, 1, None);
        let zero = Version::release(1, 1, 0);
        assert!(floating.precedence() < zero.precedence());
        assert_eq!(
            Version::release(1, 1, 0).with_prerelease("x").precedence(),
            zero.precedence()
        );
        assert!(Version::new(1, 9, None).precedence() < Version::new(1, 10, None).precedence());
    }

    #[test]
    fn test_classification() {
        assert!(Version::release(1, 0, 0).is_release());
        assert!(!Version::release(1, 0, 0).with_prerelease("rc1").is_release());
        assert!(!Version::new(1, 0, None).is_release());
        assert!(Version::new(1, 0, None).is_floating());
    }

    #[test]
    fn test_version_part_from_str() {
        assert_eq!("major".parse::<VersionPart>().unwrap(), VersionPart::Major);
        assert_eq!("MINOR".parse::<VersionPart>().unwrap(), VersionPart::Minor);
        assert_eq!("patch".parse::<VersionPart>().unwrap(), VersionPart::Patch);
        assert!("build".parse::<VersionPart>().is_err());
    }
}
