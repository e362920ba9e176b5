//! Source-control abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations the
//! tag resolver needs, allowing for a real repository implementation and a
//! mock implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [SourceControl] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A fake for testing resolution rules
//! - [unavailable::UnavailableRepository]: Stand-in when no repository can be opened
//!
//! # Usage
//!
//! Code should depend on the [SourceControl] trait rather than concrete
//! implementations so selection and bump rules run without a real repository.
//!
//! ```rust
//! # use git_tag_version::git::SourceControl;
//! # fn example<R: SourceControl>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! let tags = repo.list_tags(Some("v*"))?;
//! let commits = repo.commit_count()?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;
pub mod unavailable;

pub use mock::MockRepository;
pub use repository::Git2Repository;
pub use unavailable::UnavailableRepository;

use crate::error::Result;

/// Source-control collaborator used by the tag resolver
///
/// Every method is a blocking call. Read operations report failure through
/// `Err`; the resolver decides the fallback. Mutations report failure through
/// `Err` as well and the resolver turns it into a boolean status.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): Test implementation recording every mutation
pub trait SourceControl {
    /// List tag names, optionally filtered by a glob pattern (e.g. `"v*"`)
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Tag names in repository order
    /// * `Err` - If the repository cannot be read
    fn list_tags(&self, pattern: Option<&str>) -> Result<Vec<String>>;

    /// Name of a tag pointing exactly at the checked-out commit
    ///
    /// Fails when no tag points at HEAD.
    fn describe_exact_tag(&self) -> Result<String>;

    /// Short name of the checked-out branch, or `HEAD` when detached
    fn current_branch(&self) -> Result<String>;

    /// Abbreviated id of the checked-out commit
    fn current_commit_short(&self) -> Result<String>;

    /// Number of commits reachable from HEAD
    fn commit_count(&self) -> Result<usize>;

    /// Create a lightweight tag on HEAD
    ///
    /// # Arguments
    /// * `name` - Name for the new tag
    ///
    /// # Returns
    /// * `Ok(())` - Success
    /// * `Err` - If the tag already exists or HEAD cannot be resolved
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Publish a local tag to the configured remote
    fn push_tag(&self, name: &str) -> Result<()>;

    /// Delete a local tag
    fn delete_tag(&self, name: &str) -> Result<()>;

    /// Delete a tag on the configured remote
    fn push_tag_deletion(&self, name: &str) -> Result<()>;
}

impl<T: SourceControl + ?Sized> SourceControl for Box<T> {
    fn list_tags(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        (**self).list_tags(pattern)
    }

    fn describe_exact_tag(&self) -> Result<String> {
        (**self).describe_exact_tag()
    }

    fn current_branch(&self) -> Result<String> {
        (**self).current_branch()
    }

    fn current_commit_short(&self) -> Result<String> {
        (**self).current_commit_short()
    }

    fn commit_count(&self) -> Result<usize> {
        (**self).commit_count()
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        (**self).create_tag(name)
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        (**self).push_tag(name)
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        (**self).delete_tag(name)
    }

    fn push_tag_deletion(&self, name: &str) -> Result<()> {
        (**self).push_tag_deletion(name)
    }
}
