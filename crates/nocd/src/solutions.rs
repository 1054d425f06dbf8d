//! Flat-file solution document store
//!
//! One markdown file per solution code, `<dir>/<code>.md`. A missing
//! file is a normal outcome (`Ok(None)`); only real I/O trouble is an
//! error.

use anyhow::{Context, Result};
use noc_common::solution::SolutionStore;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct FileSolutionStore {
    dir: PathBuf,
}

impl FileSolutionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl SolutionStore for FileSolutionStore {
    fn fetch_document(&self, code: &str) -> Result<Option<String>> {
        // Codes are plain alphanumerics; anything else cannot name a
        // document file (and must not walk the filesystem).
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(None);
        }

        let path = self.dir.join(format!("{}.md", code));
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text.trim_end().to_string())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("failed to read solution document: {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_document_by_code() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("FA00007.md"), "更换光模块并复测\n").unwrap();

        let store = FileSolutionStore::new(dir.path().to_path_buf());
        assert_eq!(
            store.fetch_document("FA00007").unwrap().as_deref(),
            Some("更换光模块并复测")
        );
    }

    #[test]
    fn test_missing_document_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSolutionStore::new(dir.path().to_path_buf());
        assert!(store.fetch_document("FA00099").unwrap().is_none());
    }

    #[test]
    fn test_non_code_names_never_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSolutionStore::new(dir.path().to_path_buf());
        assert!(store.fetch_document("../etc/passwd").unwrap().is_none());
        assert!(store.fetch_document("").unwrap().is_none());
    }
}
