//! Package build driver.
//!
//! Writes the version record, prepares the output directory and runs the
//! configured build backend as an external command.

use crate::config::BuildConfig;
use crate::domain::Metadata;
use crate::error::{Result, TagVersionError};
use crate::record::RecordStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable carrying the resolved version to the backend
pub const VERSION_ENV: &str = "TAG_VERSION";

/// Runs the build backend for a package directory
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    package_dir: PathBuf,
    output_dir: PathBuf,
    backend: BuildConfig,
}

impl PackageBuilder {
    /// Create a builder; `output_dir` defaults to `<package_dir>/dist`
    pub fn new(package_dir: impl Into<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        let package_dir = package_dir.into();
        let output_dir = output_dir.unwrap_or_else(|| package_dir.join("dist"));

        PackageBuilder {
            package_dir,
            output_dir,
            backend: BuildConfig::default(),
        }
    }

    /// Use a specific backend command
    pub fn with_backend(mut self, backend: BuildConfig) -> Self {
        self.backend = backend;
        self
    }

    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the version record the package ships with
    pub fn write_version_files<S: RecordStore>(&self, store: &S, metadata: &Metadata) -> Result<()> {
        store.write(metadata)?;
        tracing::info!(version = %metadata.version, "version files written");
        Ok(())
    }

    /// Create the output directory, emptying it first when `clean` is set
    pub fn prepare_output_dir(&self, clean: bool) -> Result<()> {
        if clean && self.output_dir.exists() {
            for entry in fs::read_dir(&self.output_dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    fs::remove_dir_all(&path)?;
                } else {
                    fs::remove_file(&path)?;
                }
            }
            tracing::debug!(dir = %self.output_dir.display(), "cleaned output directory");
        }

        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Backend arguments with placeholders substituted
    pub fn backend_args(&self, version: &str) -> Vec<String> {
        let package_dir = self.package_dir.display().to_string();
        let output_dir = self.output_dir.display().to_string();

        self.backend
            .args
            .iter()
            .map(|arg| {
                arg.replace("{version}", version)
                    .replace("{package_dir}", &package_dir)
                    .replace("{output_dir}", &output_dir)
            })
            .collect()
    }

    /// Run the build backend.
    ///
    /// # Errors
    /// Returns a build error if the command cannot be started or exits
    /// with a non-zero status.
    pub fn run_backend(&self, version: &str) -> Result<()> {
        let args = self.backend_args(version);
        tracing::info!(command = %self.backend.command, args = ?args, "running build backend");

        let output = Command::new(&self.backend.command)
            .args(&args)
            .current_dir(&self.package_dir)
            .env(VERSION_ENV, version)
            .output()
            .map_err(|e| {
                TagVersionError::build(format!(
                    "Failed to execute '{}': {}",
                    self.backend.command, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(TagVersionError::build(format!(
                "'{}' failed with exit code {}\nStdout: {}\nStderr: {}",
                self.backend.command,
                output.status.code().unwrap_or(-1),
                stdout,
                stderr
            )));
        }

        Ok(())
    }
}
