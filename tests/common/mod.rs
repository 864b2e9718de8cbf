pub mod mocks;

use std::{fs, path::PathBuf};

use tempfile::TempDir;

/// Writes `content` to `name` inside `dir` and returns its path.
pub fn fixture(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write CSV fixture");
    path
}
