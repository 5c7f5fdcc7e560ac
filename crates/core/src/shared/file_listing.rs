use std::fs;
use std::path::{Path, PathBuf};

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Regular files in `dir` with one of `extensions`, sorted by path.
pub fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_extension(p, extensions))
        .collect();
    paths.sort();
    Ok(paths)
}
