use std::path::PathBuf;

use tempfile::TempDir;

/// Create a temp project dir containing the given source files, returning
/// the dir handle and the absolute paths in the same order. The caller
/// must hold onto `TempDir` to keep the files alive.
pub fn setup_project(files: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for name in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, "// fixture\n").unwrap();
        paths.push(path);
    }
    (dir, paths)
}
