//! Discovery and existence checks against a real on-disk tree.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use wq_io::{
    directory_exists, file_exists, find_files, find_geotiff_files, find_json_files,
};

/// A small scene tree:
///
/// ```text
/// root/
///   notes.txt
///   2024/01/scene_a.tif
///   2024/01/scene_b.TIFF
///   2024/01/scene_b.json
///   2024/02/scene_c.tif
/// ```
fn scene_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("2024/01")).unwrap();
    fs::create_dir_all(root.join("2024/02")).unwrap();
    fs::write(root.join("notes.txt"), b"notes").unwrap();
    fs::write(root.join("2024/01/scene_a.tif"), b"tif").unwrap();
    fs::write(root.join("2024/01/scene_b.TIFF"), b"tif").unwrap();
    fs::write(root.join("2024/01/scene_b.json"), b"{}").unwrap();
    fs::write(root.join("2024/02/scene_c.tif"), b"tif").unwrap();
    dir
}

fn as_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ============================================================================
// Existence checks
// ============================================================================

#[tokio::test]
async fn test_file_exists_distinguishes_files_from_directories() {
    let dir = scene_tree();
    let root = dir.path();

    assert!(file_exists(&as_str(&root.join("notes.txt"))).await.unwrap());
    assert!(!file_exists(&as_str(&root.join("2024"))).await.unwrap());
    assert!(!file_exists(&as_str(&root.join("missing.tif"))).await.unwrap());

    assert!(directory_exists(&as_str(&root.join("2024"))).await.unwrap());
    assert!(!directory_exists(&as_str(&root.join("notes.txt"))).await.unwrap());
    assert!(!directory_exists(&as_str(&root.join("nowhere"))).await.unwrap());
}

// ============================================================================
// Recursive discovery
// ============================================================================

#[tokio::test]
async fn test_find_geotiff_files_recurses_and_matches_case_insensitively() {
    let dir = scene_tree();
    let mut found = find_geotiff_files(&as_str(dir.path()), ".*").await.unwrap();
    found.sort();

    assert_eq!(found.len(), 3);
    assert!(found[0].ends_with("2024/01/scene_a.tif"));
    assert!(found[1].ends_with("2024/01/scene_b.TIFF"));
    assert!(found[2].ends_with("2024/02/scene_c.tif"));
}

#[tokio::test]
async fn test_find_json_files_ignores_other_extensions() {
    let dir = scene_tree();
    let found = find_json_files(&as_str(dir.path()), ".*").await.unwrap();

    assert_eq!(found.len(), 1);
    assert!(found[0].ends_with("scene_b.json"));
}

// ============================================================================
// Name patterns and predicates
// ============================================================================

#[tokio::test]
async fn test_name_pattern_searches_the_base_name() {
    let dir = scene_tree();

    let found = find_geotiff_files(&as_str(dir.path()), "scene_a").await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].ends_with("scene_a.tif"));

    // The pattern must not match against the directory part.
    let found = find_geotiff_files(&as_str(dir.path()), "2024/01").await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_find_files_with_custom_predicate() {
    let dir = scene_tree();
    let found = find_files(&as_str(dir.path()), ".*", |path| path.ends_with(".txt"))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert!(found[0].ends_with("notes.txt"));
}

#[tokio::test]
async fn test_find_under_missing_root_is_empty() {
    let dir = scene_tree();
    let found = find_geotiff_files(&as_str(&dir.path().join("nope")), ".*")
        .await
        .unwrap();
    assert!(found.is_empty());
}
