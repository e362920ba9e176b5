use crate::error::{Result, TagVersionError};
use crate::git::SourceControl;

/// Source control that fails every call.
///
/// Used when the package directory is not inside a repository, so version
/// queries still fall back to the stored record or the default.
#[derive(Debug, Clone)]
pub struct UnavailableRepository {
    reason: String,
}

impl UnavailableRepository {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailableRepository {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(TagVersionError::tag(format!(
            "source control unavailable: {}",
            self.reason
        )))
    }
}

impl SourceControl for UnavailableRepository {
    fn list_tags(&self, _pattern: Option<&str>) -> Result<Vec<String>> {
        self.fail()
    }

    fn describe_exact_tag(&self) -> Result<String> {
        self.fail()
    }

    fn current_branch(&self) -> Result<String> {
        self.fail()
    }

    fn current_commit_short(&self) -> Result<String> {
        self.fail()
    }

    fn commit_count(&self) -> Result<usize> {
        self.fail()
    }

    fn create_tag(&self, _name: &str) -> Result<()> {
        self.fail()
    }

    fn push_tag(&self, _name: &str) -> Result<()> {
        self.fail()
    }

    fn delete_tag(&self, _name: &str) -> Result<()> {
        self.fail()
    }

    fn push_tag_deletion(&self, _name: &str) -> Result<()> {
        self.fail()
    }
}
