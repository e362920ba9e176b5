/// Placeholder used when the branch cannot be determined
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Represents a git branch as seen from the working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    pub is_detached: bool,
}

impl BranchContext {
    /// Create a new branch context.
    ///
    /// `HEAD` is what git reports for a detached checkout.
    pub fn new(name: impl Into<String>) -> Self {
        let name_str = name.into();
        let is_detached = name_str == "HEAD";

        BranchContext {
            name: name_str,
            is_detached,
        }
    }

    /// Branch component for a development version's local label.
    ///
    /// `/` becomes `.` and a detached HEAD becomes `unknown`.
    pub fn version_label(&self) -> String {
        if self.is_detached || self.name.is_empty() {
            UNKNOWN_BRANCH.to_string()
        } else {
            self.name.replace('/', ".")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_branch() {
        let branch = BranchContext::new("main");
        assert!(!branch.is_detached);
        assert_eq!(branch.version_label(), "main");
    }

    #[test]
    fn test_nested_branch() {
        let branch = BranchContext::new("feature/auth/login");
        assert_eq!(branch.version_label(), "feature.auth.login");
    }

    #[test]
    fn test_detached_head() {
        let branch = BranchContext::new("HEAD");
        assert!(branch.is_detached);
        assert_eq!(branch.version_label(), "unknown");
    }
}
