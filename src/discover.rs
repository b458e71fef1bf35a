use crate::audio;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walk `root` recursively and collect every file with a supported
/// audio extension. The result is sorted so a batch over the same tree
/// is always submitted in the same order.
pub fn audio_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| audio::is_supported(path))
        .collect();

    files.sort();
    files
}
