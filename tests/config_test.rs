// tests/config_test.rs
use git_tag_version::config::{load_config, Config};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.version.default, "0.0.1-dev0");
    assert_eq!(config.version.dev_base, "0.0.1");
    assert_eq!(config.tags.remote, "origin");
    assert_eq!(
        config.build.args,
        vec!["-m", "build", "--outdir", "{output_dir}", "{package_dir}"]
    );
}

#[test]
fn test_load_from_file() {
    let config = load_config(Some("tests/fixtures/tagversion.toml"))
        .expect("Failed to load test config");

    assert_eq!(config.version.default, "0.1.0-dev0");
    assert_eq!(config.version.dev_base, "0.1.0");
    assert_eq!(config.tags.remote, "upstream");
    assert!(config.tags.push);
    assert!(!config.tags.cleanup_floating);
    assert_eq!(config.record.path, "src/mypkg/version.json");
    assert_eq!(config.build.command, "make");
    assert_eq!(config.build.args, vec!["dist", "VERSION={version}"]);
}

#[test]
fn test_load_partial_file_keeps_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[record]
path = "meta/version.json"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.record.path, "meta/version.json");
    assert_eq!(config.tags, Config::default().tags);
    assert_eq!(config.build, Config::default().build);
}

#[test]
fn test_invalid_file_is_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[tags]\npush = \"sometimes\"\n").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_missing_explicit_file_is_io_error() {
    let err = load_config(Some("tests/fixtures/does-not-exist.toml")).unwrap_err();
    assert!(err.to_string().contains("I/O error"));
}
