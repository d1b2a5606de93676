//! Resolves the input argument into the list of videos to process.

use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::VIDEO_EXTENSIONS;
use crate::shared::error::PipelineError;

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// A file is taken as is; a directory yields its video files (not
/// recursive) in name order.
pub fn discover_videos(input: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(PipelineError::InvalidInput {
            path: input.to_path_buf(),
            reason: "no such file or directory".to_string(),
        });
    }

    let entries = fs::read_dir(input).map_err(|e| PipelineError::InvalidInput {
        path: input.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut videos: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_video_file(path))
        .collect();
    videos.sort();
    log::debug!("Found {} video(s) in {}", videos.len(), input.display());
    Ok(videos)
}

/// `clip.mp4` → `clip_processed`, `videos/` → `videos_processed`, next to
/// the input.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let base = if input.is_dir() {
        input.to_path_buf()
    } else {
        input.with_extension("")
    };
    let mut name = base
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "video".into());
    name.push("_processed");
    base.with_file_name(name)
}

pub fn ensure_output_dir(dir: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::InvalidInput {
        path: dir.to_path_buf(),
        reason: format!("cannot create output directory: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.mp4", true)]
    #[case("a.MKV", true)]
    #[case("a.webm", true)]
    #[case("a.m4v", true)]
    #[case("a.txt", false)]
    #[case("mp4", false)]
    fn test_is_video_file(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_video_file(Path::new(name)), expected);
    }

    #[test]
    fn test_directory_listing_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mov", "a.mp4", "notes.txt", "c.MKV"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let videos = discover_videos(dir.path()).unwrap();
        let names: Vec<_> = videos
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.mov", "c.MKV"]);
    }

    #[test]
    fn test_single_file_taken_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.avi");
        fs::write(&file, b"x").unwrap();
        assert_eq!(discover_videos(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_missing_input_is_invalid() {
        let err = discover_videos(Path::new("/nonexistent/input")).unwrap_err();
        assert_eq!(err.kind(), "invalid-input");
    }

    #[test]
    fn test_default_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.mp4");
        fs::write(&file, b"x").unwrap();
        assert_eq!(default_output_dir(&file), dir.path().join("clip_processed"));

        let videos = dir.path().join("videos");
        fs::create_dir(&videos).unwrap();
        assert_eq!(
            default_output_dir(&videos),
            dir.path().join("videos_processed")
        );
    }

    #[test]
    fn test_ensure_output_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }
}
