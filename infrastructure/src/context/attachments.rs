//! Loading `--file` attachments
//!
//! Each argument is either a path or a glob pattern. Files are read as
//! UTF-8 text; anything unreadable is reported and skipped so one bad path
//! never blocks the task.

use std::fs;
use std::path::{Path, PathBuf};
use tandem_domain::ContextBlob;
use tracing::{debug, warn};

/// An attachment that could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFailure {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Attachments {
    pub blobs: Vec<ContextBlob>,
    pub failures: Vec<AttachmentFailure>,
}

impl Attachments {
    pub fn total_chars(&self) -> usize {
        self.blobs.iter().map(|b| b.content.chars().count()).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttachmentLoader {
    base_dir: Option<PathBuf>,
}

impl AttachmentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative arguments against `dir` instead of the working directory
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn load<S: AsRef<str>>(&self, args: &[S]) -> Attachments {
        let mut attachments = Attachments::default();

        for arg in args {
            let arg = arg.as_ref();
            if is_pattern(arg) {
                self.load_pattern(arg, &mut attachments);
            } else {
                let path = self.resolve(arg);
                self.load_file(arg.to_string(), &path, &mut attachments);
            }
        }

        debug!(
            "Loaded {} attachment(s), {} failed",
            attachments.blobs.len(),
            attachments.failures.len()
        );
        attachments
    }

    fn resolve(&self, arg: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) if Path::new(arg).is_relative() => base.join(arg),
            _ => PathBuf::from(arg),
        }
    }

    fn load_pattern(&self, pattern: &str, out: &mut Attachments) {
        let full = self.resolve(pattern);
        let full = full.to_string_lossy();

        let paths = match glob::glob(&full) {
            Ok(paths) => paths,
            Err(e) => {
                fail(out, pattern, format!("invalid pattern: {}", e));
                return;
            }
        };

        let mut matched = false;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    matched = true;
                    let label = path.display().to_string();
                    self.load_file(label, &path, out);
                }
                Ok(_) => {}
                Err(e) => fail(out, &e.path().display().to_string(), e.error().to_string()),
            }
        }
        if !matched {
            fail(out, pattern, "no files matched".to_string());
        }
    }

    fn load_file(&self, label: String, path: &Path, out: &mut Attachments) {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => {
                debug!("Skipping empty attachment {}", path.display());
            }
            Ok(content) => out.blobs.push(ContextBlob::new(label, content)),
            Err(e) => fail(out, &label, e.to_string()),
        }
    }
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

fn fail(out: &mut Attachments, path: &str, reason: String) {
    warn!("Skipping attachment {}: {}", path, reason);
    out.failures.push(AttachmentFailure {
        path: path.to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("lib.rs"), "pub fn lib() {}").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();
        fs::write(dir.path().join("empty.txt"), "  \n").unwrap();
        dir
    }

    #[test]
    fn test_loads_plain_paths() {
        let dir = workspace();
        let loader = AttachmentLoader::new().with_base_dir(dir.path());

        let loaded = loader.load(&["main.rs", "notes.md"]);

        assert_eq!(loaded.blobs.len(), 2);
        assert_eq!(loaded.blobs[0].label, "main.rs");
        assert_eq!(loaded.blobs[0].content, "fn main() {}");
        assert!(loaded.failures.is_empty());
        assert_eq!(loaded.total_chars(), 19);
    }

    #[test]
    fn test_missing_file_reported_and_skipped() {
        let dir = workspace();
        let loader = AttachmentLoader::new().with_base_dir(dir.path());

        let loaded = loader.load(&["missing.rs", "main.rs"]);

        assert_eq!(loaded.blobs.len(), 1);
        assert_eq!(loaded.failures.len(), 1);
        assert_eq!(loaded.failures[0].path, "missing.rs");
    }

    #[test]
    fn test_glob_expands_and_skips_empty() {
        let dir = workspace();
        let loader = AttachmentLoader::new().with_base_dir(dir.path());

        let loaded = loader.load(&["*.rs", "*.txt"]);

        assert_eq!(loaded.blobs.len(), 2);
        assert!(loaded.blobs.iter().all(|b| b.label.ends_with(".rs")));
        assert!(loaded.failures.is_empty());
    }

    #[test]
    fn test_unmatched_pattern_is_a_failure() {
        let dir = workspace();
        let loader = AttachmentLoader::new().with_base_dir(dir.path());

        let loaded = loader.load(&["*.py"]);

        assert!(loaded.blobs.is_empty());
        assert_eq!(loaded.failures[0].reason, "no files matched");
    }
}
