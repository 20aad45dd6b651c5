//! Reading a project directory into memory.
//!
//! This module provides [`ProjectWalker`], which uses the `ignore` crate to
//! walk a project while respecting `.gitignore` patterns, and reads every
//! file it keeps into a path-to-text map the converter accepts.
//!
//! # Features
//!
//! - Respects `.gitignore` and `.ignore` patterns
//! - Skips dependency and build output directories
//! - Produces project-relative, forward-slash UTF-8 paths
//! - Separates binary files (images, fonts) from text files
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use rn_convert::ProjectWalker;
//!
//! let walker = ProjectWalker::new(Utf8Path::new("./my-spa"))?;
//! let project = walker.read_project()?;
//! println!("{} text files, {} binary", project.files.len(), project.binary.len());
//! # Ok::<(), rn_convert::ConvertError>(())
//! ```

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::error::ConvertError;

/// Directories never read, in addition to the configured ones.
const SKIP_DIRECTORIES: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".git",
    ".next",
    "coverage",
    ".cache",
    ".turbo",
];

/// A project read from disk.
#[derive(Debug, Clone, Default)]
pub struct ProjectFiles {
    /// Text files by project-relative path.
    pub files: BTreeMap<String, String>,
    /// Project-relative paths of files that are not valid UTF-8.
    pub binary: Vec<Utf8PathBuf>,
}

/// A walker that discovers the files of a project directory.
///
/// Paths are collected first on one thread; parallel work is left to
/// the orchestrator.
#[derive(Debug)]
pub struct ProjectWalker {
    /// The project root.
    root: Utf8PathBuf,
    /// Additional directory names to skip.
    skip_dirs: Vec<String>,
    /// Whether to follow symbolic links.
    follow_links: bool,
}

impl ProjectWalker {
    /// Creates a walker for the given project root.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Config`] if the root doesn't exist or isn't a
    /// directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ConvertError> {
        if !root.exists() {
            return Err(ConvertError::config(format!(
                "root path does not exist: {root}"
            )));
        }
        if !root.is_dir() {
            return Err(ConvertError::config(format!(
                "root path is not a directory: {root}"
            )));
        }

        Ok(Self {
            root: root.to_owned(),
            skip_dirs: Vec::new(),
            follow_links: false,
        })
    }

    /// Adds directory names to skip during traversal.
    #[must_use]
    pub fn with_skip_dirs<S: AsRef<str>>(mut self, dirs: &[S]) -> Self {
        self.skip_dirs
            .extend(dirs.iter().map(|d| d.as_ref().to_owned()));
        self
    }

    /// Configures whether to follow symbolic links.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Returns the project root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Collects the project-relative paths of all files, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Walk`] if traversal fails and
    /// [`ConvertError::NonUtf8Path`] for a non-UTF-8 path.
    pub fn collect_paths(&self) -> Result<Vec<Utf8PathBuf>, ConvertError> {
        let mut paths = Vec::new();

        for result in self.build_walker() {
            let entry = result?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let utf8_path = Utf8Path::from_path(path)
                .ok_or_else(|| ConvertError::NonUtf8Path(path.to_owned()))?;
            let Ok(relative) = utf8_path.strip_prefix(&self.root) else {
                continue;
            };
            if self.should_skip_path(relative) {
                continue;
            }
            paths.push(Utf8PathBuf::from(relative.as_str().replace('\\', "/")));
        }

        paths.sort();
        Ok(paths)
    }

    /// Reads every collected file.
    ///
    /// Files that are not valid UTF-8 are listed in
    /// [`ProjectFiles::binary`] instead of being read as text.
    ///
    /// # Errors
    ///
    /// Fails on traversal errors; an unreadable file is logged and skipped.
    pub fn read_project(&self) -> Result<ProjectFiles, ConvertError> {
        let paths = self.collect_paths()?;
        tracing::info!(root = %self.root, count = paths.len(), "collected project files");

        let mut project = ProjectFiles::default();
        for relative in paths {
            let absolute = self.root.join(&relative);
            match std::fs::read(&absolute) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => {
                        project.files.insert(relative.into_string(), text);
                    }
                    Err(_) => project.binary.push(relative),
                },
                Err(source) => {
                    let err = ConvertError::read(&absolute, source);
                    tracing::warn!(error = %err, "skipping unreadable file");
                }
            }
        }
        Ok(project)
    }

    /// Builds the ignore walker with configured settings.
    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            // .gitignore, .ignore and hidden files
            .standard_filters(true)
            .follow_links(self.follow_links)
            // Parallel work happens later, per file
            .threads(1)
            .require_git(false)
            .build()
    }

    /// Checks if a path lies in a skipped directory.
    fn should_skip_path(&self, relative: &Utf8Path) -> bool {
        let mut components = relative.components();
        components.next_back();
        components.any(|component| {
            let name = component.as_str();
            SKIP_DIRECTORIES.contains(&name) || self.skip_dirs.iter().any(|d| d == name)
        })
    }
}
