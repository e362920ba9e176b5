//! Tag resolution: picks the authoritative version from repository tags and
//! manages the tags a build creates or retires.
//!
//! # Precedence
//!
//! 1. Release tags (explicit patch, no prerelease): highest `(major, minor, patch)`.
//! 2. Otherwise any parseable tag, highest `(major, minor, patch-or-none)`,
//!    with a trailing `-pre` removed from the winner.
//! 3. Otherwise nothing resolves and callers use the stored record or the
//!    configured default.
//!
//! Ordering is always by parsed components, so `v1.10` outranks `v1.9`.

use crate::config::VersionConfig;
use crate::domain::branch::{BranchContext, UNKNOWN_BRANCH};
use crate::domain::tag::{strip_v, tag_name_for};
use crate::domain::version::bump_version_str;
use crate::domain::{Metadata, Tag, Version, VersionPart};
use crate::error::Result;
use crate::git::SourceControl;
use crate::record::RecordStore;

/// Outcome of build version resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVersion {
    /// Bare version string (no `v`)
    pub version: String,
    /// A new release tag was created for `version`
    pub tag_created: bool,
    /// Floating tag the release was derived from
    pub floating_tag: Option<String>,
}

impl BuildVersion {
    fn plain(version: impl Into<String>) -> Self {
        BuildVersion {
            version: version.into(),
            tag_created: false,
            floating_tag: None,
        }
    }
}

/// Ranking inside a candidate bucket. Without a prerelease beats with one.
fn rank(tag: &Tag) -> Option<((u32, u32, Option<u32>), bool)> {
    tag.version
        .as_ref()
        .map(|v| (v.precedence(), v.prerelease.is_none()))
}

/// Highest ranked candidate; on a tie the first listed wins
fn pick_max<'a>(candidates: impl Iterator<Item = &'a Tag>) -> Option<&'a Tag> {
    candidates.fold(None, |best, tag| match best {
        Some(current) if rank(tag) <= rank(current) => Some(current),
        _ => Some(tag),
    })
}

/// Select the current version tag from a set of tags.
///
/// Returns the tag name, promoted (`-pre` removed) when it comes from the
/// prerelease fallback bucket. Unparsable tags are ignored.
pub fn select_latest_tag(tags: &[Tag]) -> Option<String> {
    if let Some(release) = pick_max(tags.iter().filter(|t| t.is_release())) {
        return Some(release.name.clone());
    }

    pick_max(tags.iter().filter(|t| t.version.is_some()))
        .map(|t| t.promoted_name().to_string())
}

/// Highest release tag (explicit patch, no prerelease) by parsed components
pub fn select_latest_release(tags: &[Tag]) -> Option<String> {
    pick_max(tags.iter().filter(|t| t.is_release())).map(|t| t.name.clone())
}

/// Resolves versions from repository tags
///
/// Source control and the version record are injected so the rules run
/// against fakes in tests.
pub struct TagResolver<R: SourceControl, S: RecordStore> {
    repo: R,
    store: S,
    versions: VersionConfig,
    push_created_tags: bool,
}

impl<R: SourceControl, S: RecordStore> TagResolver<R, S> {
    /// Create a resolver with default fallback versions
    pub fn new(repo: R, store: S) -> Self {
        TagResolver {
            repo,
            store,
            versions: VersionConfig::default(),
            push_created_tags: false,
        }
    }

    /// Override fallback versions
    pub fn with_versions(mut self, versions: VersionConfig) -> Self {
        self.versions = versions;
        self
    }

    /// Push tags created during build version resolution
    pub fn with_push(mut self, push: bool) -> Self {
        self.push_created_tags = push;
        self
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn parsed_tags(&self) -> Option<Vec<Tag>> {
        match self.repo.list_tags(None) {
            Ok(names) => Some(names.into_iter().map(Tag::new).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "cannot list tags");
                None
            }
        }
    }

    fn commit_or_unknown(&self) -> String {
        self.repo.current_commit_short().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "cannot resolve current commit");
            UNKNOWN_BRANCH.to_string()
        })
    }

    fn branch_or_unknown(&self) -> String {
        self.repo.current_branch().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "cannot resolve current branch");
            UNKNOWN_BRANCH.to_string()
        })
    }

    /// Fresh snapshot for `version` from the current commit, branch and clock
    pub fn snapshot(&self, version: &str) -> Metadata {
        Metadata::now(version, self.commit_or_unknown(), self.branch_or_unknown())
    }

    /// Write a snapshot through the record store. Failures are logged only.
    pub fn persist(&self, version: &str) {
        let metadata = self.snapshot(version);
        if let Err(e) = self.store.write(&metadata) {
            tracing::warn!(version, error = %e, "cannot write version record");
        }
    }

    /// Latest tag by the precedence rules, `None` when no tag parses
    pub fn resolve_latest_tag(&self) -> Option<String> {
        let tags = self.parsed_tags()?;
        let latest = select_latest_tag(&tags);
        tracing::debug!(candidates = tags.len(), latest = ?latest, "resolved latest tag");
        latest
    }

    fn fallback_version(&self) -> String {
        match self.store.read() {
            Ok(Some(record)) if !record.version.is_empty() => {
                tracing::debug!(version = %record.version, "using stored version record");
                record.version
            }
            Ok(_) => self.versions.default.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "cannot read version record");
                self.versions.default.clone()
            }
        }
    }

    /// Current version without a `v` prefix.
    ///
    /// Persists a snapshot when a tag resolves. Otherwise falls back to the
    /// stored record, then to the configured default. Never empty.
    pub fn get_version(&self) -> String {
        match self.resolve_latest_tag() {
            Some(tag) => {
                let version = strip_v(&tag).to_string();
                self.persist(&version);
                version
            }
            None => self.fallback_version(),
        }
    }

    /// Snapshot of the current version, commit, branch and time
    pub fn get_metadata(&self) -> Metadata {
        let version = self.get_version();
        self.snapshot(&version)
    }

    /// Bump `current` by `part`, returning the bare version
    pub fn bump_version(&self, current: &str, part: VersionPart) -> Result<String> {
        bump_version_str(current, part)
    }

    /// True when at least one tag points exactly at the checked-out commit
    pub fn is_on_current_commit(&self) -> bool {
        self.repo.describe_exact_tag().is_ok()
    }

    /// First patch release not yet tagged in the `major.minor` lineage.
    ///
    /// One past the highest release tag of the lineage, or `.0` when the
    /// lineage has no release tag yet. `None` once the lineage is at
    /// patch `u32::MAX`.
    pub fn next_patch_for(&self, major: u32, minor: u32) -> Option<Version> {
        let highest = self
            .parsed_tags()
            .unwrap_or_default()
            .into_iter()
            .filter(|t| t.is_release())
            .filter_map(|t| t.version)
            .filter(|v| v.major == major && v.minor == minor)
            .filter_map(|v| v.patch)
            .max();

        match highest {
            Some(patch) => Some(Version::release(major, minor, patch.checked_add(1)?)),
            None => Some(Version::release(major, minor, 0)),
        }
    }

    /// Development version `BASE.devN+BRANCH.COMMIT`.
    ///
    /// BASE is the latest release tag without `v`, or the configured dev
    /// base when no release tag exists. When the commit count or id is
    /// unavailable the result is `BASE.dev0`. The result is persisted before
    /// it is returned.
    pub fn development_version(&self) -> String {
        let base = self
            .parsed_tags()
            .and_then(|tags| select_latest_release(&tags))
            .map(|t| strip_v(&t).to_string())
            .unwrap_or_else(|| self.versions.dev_base.clone());

        let version = match (self.repo.commit_count(), self.repo.current_commit_short()) {
            (Ok(count), Ok(commit)) => {
                let branch = self
                    .repo
                    .current_branch()
                    .map(|b| BranchContext::new(b).version_label())
                    .unwrap_or_else(|_| UNKNOWN_BRANCH.to_string());
                format!("{}.dev{}+{}.{}", base, count, branch, commit)
            }
            (count, commit) => {
                tracing::warn!(
                    count_error = ?count.err().map(|e| e.to_string()),
                    commit_error = ?commit.err().map(|e| e.to_string()),
                    "commit information unavailable, using dev0"
                );
                format!("{}.dev0", base)
            }
        };

        self.persist(&version);
        version
    }

    /// Version for a build, with the floating tag it came from.
    ///
    /// - An override always wins.
    /// - On a tagged commit (unless `force_dev`), the latest tag by the
    ///   precedence rules. A `major.minor` tag is turned into the next patch
    ///   release of its lineage and tagged.
    /// - Anything else gets a development version.
    pub fn resolve_build_version(
        &self,
        override_version: Option<&str>,
        force_dev: bool,
    ) -> BuildVersion {
        if let Some(version) = override_version {
            tracing::debug!(version, "using version override");
            return BuildVersion::plain(version);
        }

        if !force_dev && self.is_on_current_commit() {
            if let Some(build) = self.release_from_latest_tag() {
                return build;
            }
        }

        BuildVersion::plain(self.development_version())
    }

    fn release_from_latest_tag(&self) -> Option<BuildVersion> {
        let tag = Tag::new(self.resolve_latest_tag()?);
        let version = tag.version.as_ref()?;

        if !version.is_floating() {
            return Some(BuildVersion::plain(strip_v(&tag.name)));
        }

        let Some(next) = self.next_patch_for(version.major, version.minor) else {
            tracing::warn!(floating = %tag.name, "patch range exhausted for lineage");
            return None;
        };
        let release = next.to_string();
        tracing::info!(floating = %tag.name, release = %release, "deriving release from floating tag");
        let tag_created = self.create_tag(&release, self.push_created_tags);

        Some(BuildVersion {
            version: release,
            tag_created,
            floating_tag: Some(tag.name),
        })
    }

    /// `(version, tag_was_created)` for a build
    pub fn determine_build_version(
        &self,
        override_version: Option<&str>,
        force_dev: bool,
    ) -> (String, bool) {
        let build = self.resolve_build_version(override_version, force_dev);
        (build.version, build.tag_created)
    }

    /// Create the `v`-prefixed tag for `version`, optionally pushing it.
    ///
    /// Returns false on failure, logging the cause.
    pub fn create_tag(&self, version: &str, push: bool) -> bool {
        let name = tag_name_for(version);

        if let Err(e) = self.repo.create_tag(&name) {
            tracing::warn!(tag = %name, error = %e, "failed to create tag");
            return false;
        }
        tracing::info!(tag = %name, "created tag");

        if push {
            if let Err(e) = self.repo.push_tag(&name) {
                tracing::warn!(tag = %name, error = %e, "failed to push tag");
                return false;
            }
            tracing::info!(tag = %name, "pushed tag");
        }
        true
    }

    /// Delete the `v`-prefixed tag for `version`, optionally on the remote too.
    ///
    /// Returns false on failure, logging the cause.
    pub fn delete_tag(&self, version: &str, push: bool) -> bool {
        self.delete_tag_named(&tag_name_for(version), push)
    }

    fn delete_tag_named(&self, name: &str, push: bool) -> bool {
        if let Err(e) = self.repo.delete_tag(name) {
            tracing::warn!(tag = %name, error = %e, "failed to delete tag");
            return false;
        }
        tracing::info!(tag = %name, "deleted tag");

        if push {
            if let Err(e) = self.repo.push_tag_deletion(name) {
                tracing::warn!(tag = %name, error = %e, "failed to delete remote tag");
                return false;
            }
            tracing::info!(tag = %name, "deleted remote tag");
        }
        true
    }

    /// Parseable tags without a patch component, in listing order
    pub fn get_major_minor_tags(&self) -> Vec<String> {
        self.parsed_tags()
            .unwrap_or_default()
            .into_iter()
            .filter(Tag::is_floating)
            .map(|t| t.name)
            .collect()
    }

    /// Delete every floating tag except `keep`. Returns the deleted names.
    pub fn cleanup_floating_tags(&self, keep: &str, push: bool) -> Vec<String> {
        self.get_major_minor_tags()
            .into_iter()
            .filter(|name| name != keep)
            .filter(|name| self.delete_tag_named(name, push))
            .collect()
    }
}
