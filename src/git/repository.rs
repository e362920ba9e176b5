use crate::error::{Result, TagVersionError};
use crate::git::SourceControl;
use git2::{DescribeOptions, Repository as Git2Repo};
use std::path::Path;

/// Remote used for tag publication unless configured otherwise
pub const DEFAULT_REMOTE: &str = "origin";

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    remote: String,
}

impl Git2Repository {
    /// Open or discover the git repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo,
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    /// Use a different remote for push operations
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Name of the remote used for push operations
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Root of the working tree, `None` for bare repositories
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn push_refspec(&self, refspec: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(&self.remote).map_err(|e| {
            TagVersionError::remote(format!("Cannot find remote '{}': {}", self.remote, e))
        })?;

        let mut callbacks = remote_callbacks();
        // A rejected ref does not fail push() by itself
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => {
                tracing::warn!(refname, status, "remote rejected reference update");
                Err(git2::Error::from_str(&format!("Push failed for {}", refname)))
            }
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        remote
            .push(&[refspec], Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    TagVersionError::remote(format!("Network error during push: {}", e))
                }
                git2::ErrorClass::Reference => {
                    TagVersionError::remote(format!("Reference error during push: {}", e))
                }
                _ => TagVersionError::remote(format!("Failed to push '{}': {}", refspec, e)),
            })
    }
}

/// Credential callbacks trying SSH keys from `~/.ssh`, then the SSH agent,
/// then git's default credentials.
fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });
    callbacks
}

impl SourceControl for Git2Repository {
    fn list_tags(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(pattern)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn describe_exact_tag(&self) -> Result<String> {
        let mut options = DescribeOptions::new();
        options.describe_tags().max_candidates_tags(0);

        let describe = self
            .repo
            .describe(&options)
            .map_err(|e| TagVersionError::tag(format!("No tag on current commit: {}", e)))?;

        Ok(describe.format(None)?)
    }

    fn current_branch(&self) -> Result<String> {
        if self.repo.head_detached()? {
            return Ok("HEAD".to_string());
        }

        let head = self.repo.head()?;
        head.shorthand()
            .map(|s| s.to_string())
            .ok_or_else(|| TagVersionError::tag("HEAD reference name is not valid UTF-8"))
    }

    fn current_commit_short(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        let short = commit.as_object().short_id()?;

        short
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| TagVersionError::tag("Short commit id is not valid UTF-8"))
    }

    fn commit_count(&self) -> Result<usize> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;

        let mut count = 0;
        for oid in revwalk {
            oid?;
            count += 1;
        }
        Ok(count)
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;

        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .map_err(|e| TagVersionError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        self.push_refspec(&format!("refs/tags/{}:refs/tags/{}", name, name))
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.repo
            .tag_delete(name)
            .map_err(|e| TagVersionError::tag(format!("Cannot delete tag '{}': {}", name, e)))
    }

    fn push_tag_deletion(&self, name: &str) -> Result<()> {
        self.push_refspec(&format!(":refs/tags/{}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Git2Repo) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        (dir, repo)
    }

    fn commit(repo: &Git2Repo, message: &str) -> git2::Oid {
        let sig = repo.signature().unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_open_outside_repository_fails() {
        let dir = TempDir::new().unwrap();
        // tempdirs are not nested inside a repository on CI runners
        if Git2Repo::discover(dir.path()).is_err() {
            assert!(Git2Repository::open(dir.path()).is_err());
        }
    }

    #[test]
    fn test_unborn_repository_read_failures() {
        let (dir, _repo) = init_repo();
        let repo = Git2Repository::open(dir.path()).unwrap();

        assert!(repo.list_tags(None).unwrap().is_empty());
        assert!(repo.describe_exact_tag().is_err());
        assert!(repo.current_commit_short().is_err());
        assert!(repo.commit_count().is_err());
    }

    #[test]
    fn test_tags_branch_and_count() {
        let (dir, raw) = init_repo();
        commit(&raw, "first");
        commit(&raw, "second");
        let repo = Git2Repository::open(dir.path()).unwrap();

        assert_eq!(repo.commit_count().unwrap(), 2);
        let branch = repo.current_branch().unwrap();
        assert!(branch == "master" || branch == "main", "got {}", branch);
        assert!(repo.current_commit_short().unwrap().len() >= 7);

        repo.create_tag("v1.2").unwrap();
        repo.create_tag("release-candidate").unwrap();
        assert!(repo.create_tag("v1.2").is_err());

        let mut tags = repo.list_tags(None).unwrap();
        tags.sort();
        assert_eq!(tags, vec!["release-candidate", "v1.2"]);
        assert_eq!(repo.list_tags(Some("v*")).unwrap(), vec!["v1.2"]);

        let exact = repo.describe_exact_tag().unwrap();
        assert!(exact == "v1.2" || exact == "release-candidate");

        repo.delete_tag("v1.2").unwrap();
        repo.delete_tag("release-candidate").unwrap();
        assert!(repo.delete_tag("v1.2").is_err());
        assert!(repo.describe_exact_tag().is_err());
    }

    #[test]
    fn test_detached_head_reports_head() {
        let (dir, raw) = init_repo();
        let oid = commit(&raw, "first");
        raw.set_head_detached(oid).unwrap();
        let repo = Git2Repository::open(dir.path()).unwrap();

        assert_eq!(repo.current_branch().unwrap(), "HEAD");
    }

    #[test]
    fn test_push_without_remote_fails() {
        let (dir, raw) = init_repo();
        commit(&raw, "first");
        let repo = Git2Repository::open(dir.path()).unwrap().with_remote("nowhere");

        repo.create_tag("v1.0.0").unwrap();
        let err = repo.push_tag("v1.0.0").unwrap_err();
        assert!(err.to_string().contains("Cannot find remote 'nowhere'"));
        assert!(repo.push_tag_deletion("v1.0.0").is_err());
    }
}
