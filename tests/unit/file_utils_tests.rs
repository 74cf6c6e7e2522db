/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;

use subtrans::file_utils::{BACKUP_DIR, FileManager};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_fileExists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "exists.srt", "content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

#[test]
fn test_fileExists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

#[test]
fn test_findSubtitleFiles_shouldRecurseSortAndSkipOutputsAndBackups() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "b.srt", "x")?;
    common::create_test_file(dir, "a.ass", "x")?;
    common::create_test_file(dir, "season/c.vtt", "x")?;
    common::create_test_file(dir, "a_translated.srt", "x")?;
    common::create_test_file(dir, "notes.txt", "x")?;
    common::create_test_file(dir, &format!("{}/b_20240101_000000.srt", BACKUP_DIR), "x")?;

    let found = FileManager::find_subtitle_files(dir, "_translated")?;
    assert_eq!(
        found,
        vec![dir.join("a.ass"), dir.join("b.srt"), dir.join("season").join("c.vtt")]
    );
    Ok(())
}

#[test]
fn test_backupFile_shouldCopyIntoBackupDirWithTimestamp() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let original = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let backup = FileManager::backup_file(&original)?;

    assert_eq!(backup.parent(), Some(temp_dir.path().join(BACKUP_DIR).as_path()));
    let name = backup.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("movie_"), "{}", name);
    assert!(name.ends_with(".srt"), "{}", name);
    assert_eq!(fs::read_to_string(&backup)?, common::SAMPLE_SRT);
    Ok(())
}

#[test]
fn test_backupFile_calledRepeatedly_shouldKeepEveryBackup() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let original = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let backups = (0..5)
        .map(|_| FileManager::backup_file(&original))
        .collect::<Result<Vec<_>>>()?;

    let distinct: std::collections::HashSet<_> = backups.iter().collect();
    assert_eq!(distinct.len(), 5);
    assert_eq!(fs::read_dir(temp_dir.path().join(BACKUP_DIR))?.count(), 5);
    Ok(())
}

#[test]
fn test_writeToFile_shouldCreateParentDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("nested").join("deeper").join("out.srt");

    FileManager::write_to_file(&target, "data")?;
    assert_eq!(FileManager::read_to_string(&target)?, "data");
    Ok(())
}

#[test]
fn test_copyFile_withMissingSource_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = FileManager::copy_file(temp_dir.path().join("missing.srt"), temp_dir.path().join("copy.srt"));
    assert!(result.is_err());
    Ok(())
}
