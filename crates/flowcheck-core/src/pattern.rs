//! Filename wildcard patterns (`*.dll`, `app?.json`).
//!
//! `*` matches any run of characters, `?` exactly one character; everything
//! else is literal. Patterns are matched against a file's name only, never
//! its directory.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

/// How deep a directory search goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Search {
    /// Only the directory's immediate children.
    #[default]
    TopDirectoryOnly,
    /// The directory and every subdirectory below it.
    AllDirectories,
}

#[derive(Debug, Clone)]
pub struct FilePattern {
    source: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let mut translated = String::with_capacity(pattern.len() + 8);
        translated.push_str("(?s)^");
        let mut buf = [0u8; 4];
        for ch in pattern.chars() {
            match ch {
                '*' => translated.push_str(".*"),
                '?' => translated.push('.'),
                other => translated.push_str(&regex::escape(other.encode_utf8(&mut buf))),
            }
        }
        translated.push('$');

        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&translated)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// Files under `dir` whose names match, in walk order.
    ///
    /// A missing directory has no files. Unreadable entries are skipped; use
    /// [`FilePattern::scan`] to learn about them.
    pub fn find_files(&self, dir: &Path, search: Search) -> Vec<PathBuf> {
        self.scan(dir, search).matches
    }

    /// Like [`FilePattern::find_files`], also reporting entries the walk
    /// could not read.
    pub fn scan(&self, dir: &Path, search: Search) -> FileScan {
        let mut scan = FileScan::default();
        if !dir.is_dir() {
            return scan;
        }

        let max_depth = match search {
            Search::TopDirectoryOnly => 1,
            Search::AllDirectories => usize::MAX,
        };

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file()
                        && self.matches(&entry.file_name().to_string_lossy())
                    {
                        scan.matches.push(entry.into_path());
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, "unreadable entry");
                    scan.unreadable.push(err.path().unwrap_or(dir).to_path_buf());
                }
            }
        }
        scan
    }
}

/// Outcome of walking a directory for matching files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileScan {
    pub matches: Vec<PathBuf>,
    /// Entries (usually directories) the walk could not read.
    pub unreadable: Vec<PathBuf>,
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
