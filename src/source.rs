//! Access to the source text of measured files.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

pub trait SourceReader {
    /// Full text of the file at `path`, as the engine reported it.
    fn read_source(&self, path: &str) -> io::Result<String>;
}

/// Reads sources from disk, resolving relative paths against `root`.
#[derive(Debug, Clone, Default)]
pub struct FsSourceReader {
    root: Option<PathBuf>,
}

impl FsSourceReader {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SourceReader for FsSourceReader {
    fn read_source(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }
}

/// In-memory sources keyed by path.
impl SourceReader for HashMap<String, String> {
    fn read_source(&self, path: &str) -> io::Result<String> {
        self.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no source for {path}"))
        })
    }
}

/// Split source text into display lines. A trailing newline does not start
/// an extra empty line.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
