use crate::error::{Result, TagVersionError};
use crate::git::SourceControl;
use std::cell::RefCell;

/// Mock repository for testing without actual git operations
///
/// Tags live in listing order. Every mutation request is recorded, including
/// the ones configured to fail.
pub struct MockRepository {
    tags: RefCell<Vec<String>>,
    head_tag: RefCell<Option<String>>,
    branch: Option<String>,
    commit: Option<String>,
    commit_count: Option<usize>,
    tags_unavailable: bool,
    fail_mutations: bool,
    fail_push: bool,
    created: RefCell<Vec<String>>,
    pushed: RefCell<Vec<String>>,
    deleted: RefCell<Vec<String>>,
    push_deleted: RefCell<Vec<String>>,
}

impl MockRepository {
    /// Create a new mock repository on `main` at commit `abc1234`
    pub fn new() -> Self {
        MockRepository {
            tags: RefCell::new(Vec::new()),
            head_tag: RefCell::new(None),
            branch: Some("main".to_string()),
            commit: Some("abc1234".to_string()),
            commit_count: Some(1),
            tags_unavailable: false,
            fail_mutations: false,
            fail_push: false,
            created: RefCell::new(Vec::new()),
            pushed: RefCell::new(Vec::new()),
            deleted: RefCell::new(Vec::new()),
            push_deleted: RefCell::new(Vec::new()),
        }
    }

    /// Add tags to the repository (not on HEAD)
    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.borrow_mut().extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add a tag pointing at HEAD
    pub fn with_head_tag(self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tags.borrow_mut().push(tag.clone());
        *self.head_tag.borrow_mut() = Some(tag);
        self
    }

    /// Set the checked-out branch, `None` makes the lookup fail
    pub fn with_branch(mut self, branch: Option<&str>) -> Self {
        self.branch = branch.map(|b| b.to_string());
        self
    }

    /// Set the short commit id, `None` makes the lookup fail
    pub fn with_commit(mut self, commit: Option<&str>) -> Self {
        self.commit = commit.map(|c| c.to_string());
        self
    }

    /// Set the commit count, `None` makes the lookup fail
    pub fn with_commit_count(mut self, count: Option<usize>) -> Self {
        self.commit_count = count;
        self
    }

    /// Make every read of the tag namespace fail
    pub fn with_tags_unavailable(mut self) -> Self {
        self.tags_unavailable = true;
        self
    }

    /// Make local tag creation and deletion fail
    pub fn with_failing_mutations(mut self) -> Self {
        self.fail_mutations = true;
        self
    }

    /// Make pushes to the remote fail
    pub fn with_failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Tags currently present
    pub fn tags(&self) -> Vec<String> {
        self.tags.borrow().clone()
    }

    /// Names passed to `create_tag`
    pub fn created_tags(&self) -> Vec<String> {
        self.created.borrow().clone()
    }

    /// Names passed to `push_tag`
    pub fn pushed_tags(&self) -> Vec<String> {
        self.pushed.borrow().clone()
    }

    /// Names passed to `delete_tag`
    pub fn deleted_tags(&self) -> Vec<String> {
        self.deleted.borrow().clone()
    }

    /// Names passed to `push_tag_deletion`
    pub fn push_deleted_tags(&self) -> Vec<String> {
        self.push_deleted.borrow().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal glob matching for `*` wildcards, enough for tag patterns like `v*`
fn glob_match(pattern: &str, name: &str) -> bool {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    regex::Regex::new(&format!("^{}$", escaped))
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

impl SourceControl for MockRepository {
    fn list_tags(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        if self.tags_unavailable {
            return Err(TagVersionError::tag("not a git repository"));
        }

        Ok(self
            .tags
            .borrow()
            .iter()
            .filter(|t| pattern.map_or(true, |p| glob_match(p, t)))
            .cloned()
            .collect())
    }

    fn describe_exact_tag(&self) -> Result<String> {
        if self.tags_unavailable {
            return Err(TagVersionError::tag("not a git repository"));
        }

        self.head_tag
            .borrow()
            .clone()
            .ok_or_else(|| TagVersionError::tag("No tag on current commit"))
    }

    fn current_branch(&self) -> Result<String> {
        self.branch
            .clone()
            .ok_or_else(|| TagVersionError::tag("Cannot resolve HEAD"))
    }

    fn current_commit_short(&self) -> Result<String> {
        self.commit
            .clone()
            .ok_or_else(|| TagVersionError::tag("Cannot resolve HEAD"))
    }

    fn commit_count(&self) -> Result<usize> {
        self.commit_count
            .ok_or_else(|| TagVersionError::tag("Cannot walk history"))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        self.created.borrow_mut().push(name.to_string());
        if self.fail_mutations {
            return Err(TagVersionError::tag(format!("Cannot create tag '{}'", name)));
        }

        let mut tags = self.tags.borrow_mut();
        if tags.iter().any(|t| t == name) {
            return Err(TagVersionError::tag(format!("tag '{}' already exists", name)));
        }
        tags.push(name.to_string());
        Ok(())
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        self.pushed.borrow_mut().push(name.to_string());
        if self.fail_push {
            return Err(TagVersionError::remote("Network error during push"));
        }
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.deleted.borrow_mut().push(name.to_string());
        if self.fail_mutations {
            return Err(TagVersionError::tag(format!("Cannot delete tag '{}'", name)));
        }

        let mut tags = self.tags.borrow_mut();
        let before = tags.len();
        tags.retain(|t| t != name);
        if tags.len() == before {
            return Err(TagVersionError::tag(format!("tag '{}' not found", name)));
        }

        let mut head_tag = self.head_tag.borrow_mut();
        if head_tag.as_deref() == Some(name) {
            *head_tag = None;
        }
        Ok(())
    }

    fn push_tag_deletion(&self, name: &str) -> Result<()> {
        self.push_deleted.borrow_mut().push(name.to_string());
        if self.fail_push {
            return Err(TagVersionError::remote("Network error during push"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.list_tags(None).unwrap().is_empty());
        assert!(repo.describe_exact_tag().is_err());
        assert_eq!(repo.current_branch().unwrap(), "main");
    }

    #[test]
    fn test_mock_repository_list_tags_with_pattern() {
        let repo = MockRepository::new().with_tags(["v1.0.0", "release-2", "v2.0"]);

        assert_eq!(repo.list_tags(None).unwrap().len(), 3);
        assert_eq!(repo.list_tags(Some("v*")).unwrap(), vec!["v1.0.0", "v2.0"]);
        assert_eq!(repo.list_tags(Some("v1.*")).unwrap(), vec!["v1.0.0"]);
    }

    #[test]
    fn test_mock_repository_head_tag() {
        let repo = MockRepository::new().with_head_tag("v1.2");
        assert_eq!(repo.describe_exact_tag().unwrap(), "v1.2");
        assert_eq!(repo.tags(), vec!["v1.2"]);
    }

    #[test]
    fn test_mock_repository_records_mutations() {
        let repo = MockRepository::new().with_tags(["v1.0"]);

        repo.create_tag("v1.0.0").unwrap();
        assert!(repo.create_tag("v1.0.0").is_err());
        repo.delete_tag("v1.0").unwrap();
        assert!(repo.delete_tag("v1.0").is_err());

        assert_eq!(repo.created_tags(), vec!["v1.0.0", "v1.0.0"]);
        assert_eq!(repo.deleted_tags(), vec!["v1.0", "v1.0"]);
        assert_eq!(repo.tags(), vec!["v1.0.0"]);
    }

    #[test]
    fn test_mock_repository_failures() {
        let repo = MockRepository::new()
            .with_tags_unavailable()
            .with_failing_push()
            .with_commit_count(None);

        assert!(repo.list_tags(None).is_err());
        assert!(repo.push_tag("v1.0.0").is_err());
        assert!(repo.commit_count().is_err());
        assert_eq!(repo.pushed_tags(), vec!["v1.0.0"]);
    }
}
