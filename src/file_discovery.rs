use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tokio::fs;
use tracing::{debug, warn};

use crate::config::FileConfig;
use crate::error::{Error, Result};

/// Async walk over a directory tree collecting JSON documents
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// Lowercase extensions without the leading dot
    extensions: Vec<String>,
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
    /// Directory levels below the root to descend (None = unlimited)
    max_depth: Option<usize>,
    follow_symlinks: bool,
}

/// Files found by a walk, plus the entries that could not be read
#[derive(Debug, Default, Clone)]
pub struct DiscoveryStats {
    pub files_found: usize,
    pub errors: usize,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self {
            extensions: vec!["json".to_string()],
            include_set: None,
            exclude_set: None,
            max_depth: None,
            follow_symlinks: false,
        }
    }

    /// Discovery settings from the `files` configuration section
    pub fn from_config(config: &FileConfig) -> Result<Self> {
        Self::new()
            .with_extensions(config.extensions.clone())
            .with_include_patterns(&config.include_patterns)?
            .with_exclude_patterns(&config.exclude_patterns)
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|extension| extension.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Only keep files matching at least one of `patterns`
    pub fn with_include_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.include_set = build_glob_set(patterns)?;
        Ok(self)
    }

    /// Drop files matching any of `patterns`
    pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude_set = build_glob_set(patterns)?;
        Ok(self)
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Files under `path` (or `path` itself), sorted
    pub async fn discover_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.discover(path).await.map(|(files, _)| files)
    }

    /// Like [`discover_files`](Self::discover_files), also counting unreadable entries.
    ///
    /// Only a missing or unreadable root is an error; problems below it are
    /// logged and counted.
    pub async fn discover(&self, path: &Path) -> Result<(Vec<PathBuf>, DiscoveryStats)> {
        let metadata = fs::metadata(path).await?;
        let mut stats = DiscoveryStats::default();

        if metadata.is_file() {
            let files = if self.should_process(path) {
                vec![path.to_path_buf()]
            } else {
                Vec::new()
            };
            stats.files_found = files.len();
            return Ok((files, stats));
        }

        let mut files = Vec::new();
        let mut pending = vec![(path.to_path_buf(), 0usize)];

        while let Some((directory, depth)) = pending.pop() {
            let mut entries = match fs::read_dir(&directory).await {
                Ok(entries) => entries,
                Err(e) if depth == 0 => return Err(e.into()),
                Err(e) => {
                    warn!(path = %directory.display(), "skipping unreadable directory: {e}");
                    stats.errors += 1;
                    continue;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(path = %directory.display(), "error while listing directory: {e}");
                        stats.errors += 1;
                        break;
                    }
                };
                let entry_path = entry.path();

                if !self.follow_symlinks && entry_path.is_symlink() {
                    debug!(path = %entry_path.display(), "not following symlink");
                    continue;
                }

                match fs::metadata(&entry_path).await {
                    Ok(metadata) if metadata.is_dir() => {
                        if self.max_depth.is_none_or(|max| depth < max) {
                            pending.push((entry_path, depth + 1));
                        }
                    }
                    Ok(metadata) if metadata.is_file() => {
                        if self.should_process(&entry_path) {
                            files.push(entry_path);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(path = %entry_path.display(), "skipping unreadable entry: {e}");
                        stats.errors += 1;
                    }
                }
            }
        }

        files.sort();
        stats.files_found = files.len();
        debug!(root = %path.display(), files = files.len(), errors = stats.errors, "discovery finished");
        Ok((files, stats))
    }

    /// Extension check, then exclude globs, then include globs
    pub fn should_process(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        if !self.extensions.contains(&extension.to_lowercase()) {
            return false;
        }

        if let Some(exclude_set) = &self.exclude_set
            && exclude_set.is_match(path)
        {
            return false;
        }

        self.include_set
            .as_ref()
            .is_none_or(|include_set| include_set.is_match(path))
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::Config(format!("Invalid glob pattern '{}': {}", pattern, e)))?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| Error::Config(format!("Failed to build glob set: {}", e)))
}
