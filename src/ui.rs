//! Terminal output helpers.

use console::style;

use crate::domain::Metadata;

/// Print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Metadata as aligned `label: value` lines
pub fn format_metadata(metadata: &Metadata) -> String {
    format!(
        "Package version: {}\nGit commit: {}\nGit branch: {}\nTimestamp: {}",
        metadata.version, metadata.commit, metadata.branch, metadata.timestamp
    )
}

pub fn display_metadata(metadata: &Metadata) {
    println!("{}", format_metadata(metadata));
}

/// Print the lines of a list, or a note when it is empty.
pub fn display_list(title: &str, items: &[String]) {
    if items.is_empty() {
        display_status(&format!("No {}", title));
        return;
    }

    println!("{}", style(title).bold());
    for item in items {
        println!("  - {}", item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_metadata() {
        let meta = Metadata {
            version: "1.2.3".to_string(),
            commit: "abc1234".to_string(),
            branch: "main".to_string(),
            timestamp: "2024-01-01 00:00:00".to_string(),
        };

        let text = format_metadata(&meta);
        assert!(text.contains("Package version: 1.2.3"));
        assert!(text.contains("Git commit: abc1234"));
        assert!(text.contains("Git branch: main"));
    }
}
