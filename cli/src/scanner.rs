use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::ExportLayout;
use crate::error::{Result, StatsError};
use crate::models::{ExportFile, ExportLocation};

/// Locate the account and streaming folders of an extracted export.
///
/// Folders are looked up directly in `data_dir` and one level below it (the
/// root of an extracted archive). Every matching folder contributes, so
/// several extracted archives are read together. A missing `data_dir` is
/// created and reported as [`StatsError::DataDirMissing`].
pub fn scan_export(data_dir: &Path, layout: &ExportLayout) -> Result<ExportLocation> {
    if !data_dir.exists() {
        fs::create_dir_all(data_dir)?;
        return Err(StatsError::DataDirMissing(data_dir.to_path_buf()));
    }

    let account_dirs = find_folders(data_dir, &layout.account_folder)?;
    let history_dirs = find_folders(data_dir, &layout.streaming_folder)?;

    if account_dirs.is_empty() && history_dirs.is_empty() {
        let archives = list_with_extension(data_dir, "zip")?;
        if !archives.is_empty() {
            warn!(
                count = archives.len(),
                dir = %data_dir.display(),
                "found zip archives but no extracted export folders, extract them first"
            );
        }
    }

    let account_files = json_files(&account_dirs)?;
    let history_files = json_files(&history_dirs)?;

    debug!(
        account = account_files.len(),
        history = history_files.len(),
        "scanned export"
    );
    Ok(ExportLocation { account_files, history_files })
}

/// `data_dir/name` first, then `data_dir/*/name` in sorted order.
fn find_folders(data_dir: &Path, name: &str) -> Result<Vec<PathBuf>> {
    let mut subdirs: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            subdirs.push(entry.path());
        }
    }
    subdirs.sort();

    let direct = data_dir.join(name);
    let mut folders: Vec<PathBuf> = Vec::new();
    if direct.is_dir() {
        folders.push(direct);
    }
    folders.extend(subdirs.into_iter().map(|d| d.join(name)).filter(|p| p.is_dir()));
    Ok(folders)
}

fn list_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && path.extension().is_some_and(|e| e == ext) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn json_files(dirs: &[PathBuf]) -> Result<Vec<ExportFile>> {
    let mut files = Vec::new();
    for dir in dirs {
        files.extend(list_with_extension(dir, "json")?.into_iter().filter_map(|path| {
            let key = path.file_stem()?.to_string_lossy().to_string();
            Some(ExportFile { key, path })
        }));
    }
    // Stable: a key found in several folders keeps folder order
    files.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "[]").unwrap();
    }

    #[test]
    fn missing_data_dir_is_created_and_reported() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("data_to_analyze");
        let err = scan_export(&dir, &ExportLayout::default()).unwrap_err();
        assert!(matches!(err, StatsError::DataDirMissing(_)));
        assert!(dir.is_dir());
    }

    #[test]
    fn finds_folders_directly_and_one_level_down() {
        let tmp = tempdir().unwrap();
        let layout = ExportLayout::default();
        touch(&tmp.path().join(&layout.account_folder).join("Identity.json"));
        touch(&tmp.path().join(&layout.account_folder).join("notes.txt"));
        let nested = tmp.path().join("my_spotify_data").join(&layout.streaming_folder);
        touch(&nested.join("Streaming_History_Audio_2024_1.json"));
        touch(&nested.join("Streaming_History_Audio_2023_0.json"));

        let location = scan_export(tmp.path(), &layout).unwrap();
        let account: Vec<&str> = location.account_files.iter().map(|f| f.key.as_str()).collect();
        let history: Vec<&str> = location.history_files.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(account, ["Identity"]);
        assert_eq!(
            history,
            ["Streaming_History_Audio_2023_0", "Streaming_History_Audio_2024_1"]
        );
    }

    #[test]
    fn reads_every_extracted_archive() {
        let tmp = tempdir().unwrap();
        let layout = ExportLayout::default();
        let first = tmp.path().join("my_spotify_data").join(&layout.streaming_folder);
        let second = tmp.path().join("my_spotify_data_2").join(&layout.streaming_folder);
        touch(&first.join("Streaming_History_Audio_2020_0.json"));
        touch(&second.join("Streaming_History_Audio_2024_0.json"));
        touch(&second.join("Streaming_History_Video_2024.json"));

        let location = scan_export(tmp.path(), &layout).unwrap();
        let history: Vec<&str> = location.history_files.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(
            history,
            [
                "Streaming_History_Audio_2020_0",
                "Streaming_History_Audio_2024_0",
                "Streaming_History_Video_2024"
            ]
        );
        assert!(location.history_files[0].path.starts_with(&first));
    }

    #[test]
    fn empty_data_dir_yields_empty_location() {
        let tmp = tempdir().unwrap();
        let location = scan_export(tmp.path(), &ExportLayout::default()).unwrap();
        assert!(location.account_files.is_empty());
        assert!(location.history_files.is_empty());
    }
}
