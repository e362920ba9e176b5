//! Build workflow orchestration
//!
//! Ties the tag resolver to the package builder. Kept apart from the clap
//! argument struct so the workflow can run programmatically and in tests
//! against a mock repository.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::builder::PackageBuilder;
use crate::config::{Config, TagsConfig};
use crate::git::{Git2Repository, SourceControl, UnavailableRepository};
use crate::record::{JsonRecordStore, RecordStore};
use crate::resolver::{BuildVersion, TagResolver};

/// Arguments for the build workflow
#[derive(Debug, Clone, PartialEq)]
pub struct BuildWorkflowArgs {
    /// Directory containing the package to build
    pub package_dir: PathBuf,

    /// Directory receiving build artifacts, `<package_dir>/dist` when unset
    pub output_dir: Option<PathBuf>,

    /// Version to use instead of the tag-derived one
    pub version_override: Option<String>,

    /// Derive release/development versions from tag state
    pub auto_bump: bool,

    /// Build a development version even on a tagged commit
    pub force_dev: bool,

    /// Empty the output directory first
    pub clean: bool,
}

impl BuildWorkflowArgs {
    pub fn new(package_dir: impl Into<PathBuf>) -> Self {
        BuildWorkflowArgs {
            package_dir: package_dir.into(),
            output_dir: None,
            version_override: None,
            auto_bump: true,
            force_dev: false,
            clean: true,
        }
    }
}

/// Result of a successful build workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// Version the package was built with
    pub version: String,

    /// Directory holding the artifacts
    pub output_dir: PathBuf,

    /// A release tag was created for `version`
    pub tag_created: bool,

    /// Floating tags removed after the build
    pub removed_floating_tags: Vec<String>,
}

/// Resolver over the repository containing `package_dir`.
///
/// Falls back to an always-failing collaborator when no repository can be
/// opened, so version queries still reach the record and default fallbacks.
pub fn open_resolver(
    package_dir: &Path,
    config: &Config,
) -> TagResolver<Box<dyn SourceControl>, JsonRecordStore> {
    let repo: Box<dyn SourceControl> = match Git2Repository::open(package_dir) {
        Ok(repo) => Box::new(repo.with_remote(config.tags.remote.clone())),
        Err(e) => {
            tracing::warn!(dir = %package_dir.display(), error = %e, "no git repository found");
            Box::new(UnavailableRepository::new(e.to_string()))
        }
    };

    let store = JsonRecordStore::new(package_dir.join(&config.record.path));

    TagResolver::new(repo, store)
        .with_versions(config.version.clone())
        .with_push(config.tags.push)
}

/// Main build workflow
///
/// 1. Resolve the build version (override, tag state, or plain current version)
/// 2. Write the version record, unless resolution already stored this version
/// 3. Prepare the output directory
/// 4. Run the build backend; failure removes a release tag created in step 1
///    and aborts the workflow
/// 5. Retire stale floating tags when the version came from one
pub fn run_build_workflow<R: SourceControl, S: RecordStore>(
    resolver: &TagResolver<R, S>,
    builder: &PackageBuilder,
    args: &BuildWorkflowArgs,
    tags: &TagsConfig,
) -> Result<WorkflowResult> {
    let build = if args.version_override.is_some() || args.auto_bump {
        resolver.resolve_build_version(args.version_override.as_deref(), args.force_dev)
    } else {
        BuildVersion {
            version: resolver.get_version(),
            tag_created: false,
            floating_tag: None,
        }
    };
    tracing::info!(version = %build.version, tag_created = build.tag_created, "resolved build version");

    let recorded = matches!(
        resolver.store().read(),
        Ok(Some(record)) if record.version == build.version
    );
    if recorded {
        tracing::debug!(version = %build.version, "version record already current");
    } else {
        builder
            .write_version_files(resolver.store(), &resolver.snapshot(&build.version))
            .context("Failed to write version files")?;
    }

    builder.prepare_output_dir(args.clean).with_context(|| {
        format!(
            "Failed to prepare output directory '{}'",
            builder.output_dir().display()
        )
    })?;

    if let Err(e) = builder.run_backend(&build.version) {
        if build.tag_created && !resolver.delete_tag(&build.version, tags.push) {
            tracing::warn!(version = %build.version, "could not roll back release tag");
        }
        return Err(e.into());
    }

    let removed_floating_tags = match (&build.floating_tag, tags.cleanup_floating) {
        (Some(floating), true) => resolver.cleanup_floating_tags(floating, tags.push),
        _ => Vec::new(),
    };

    Ok(WorkflowResult {
        version: build.version,
        output_dir: builder.output_dir().to_path_buf(),
        tag_created: build.tag_created,
        removed_floating_tags,
    })
}
