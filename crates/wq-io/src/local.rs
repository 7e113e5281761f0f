//! Local-disk filesystem handle.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufWriter;
use walkdir::WalkDir;

use wq_common::{strip_scheme, Backend, WqResult};

use crate::filesystem::{BoxedWriter, FileSystem};

/// Local disk access. Accepts bare paths and `file://` URIs; ignores the
/// credential mode.
#[derive(Debug, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFs {
    fn backend(&self) -> Backend {
        Backend::Local
    }

    async fn exists(&self, uri: &str) -> WqResult<bool> {
        match fs::metadata(strip_scheme(uri)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn is_file(&self, uri: &str) -> WqResult<bool> {
        match fs::metadata(strip_scheme(uri)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn is_dir(&self, uri: &str) -> WqResult<bool> {
        match fs::metadata(strip_scheme(uri)).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn walk(&self, uri: &str) -> WqResult<Vec<String>> {
        let root = strip_scheme(uri);
        if !Path::new(root).is_dir() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                paths.push(entry.path().to_string_lossy().into_owned());
            }
        }
        Ok(paths)
    }

    async fn make_dirs(&self, uri: &str) -> WqResult<()> {
        fs::create_dir_all(strip_scheme(uri)).await?;
        Ok(())
    }

    async fn open_write(&self, uri: &str, buffer_bytes: usize) -> WqResult<BoxedWriter> {
        let file = fs::File::create(strip_scheme(uri)).await?;
        Ok(Box::new(BufWriter::with_capacity(buffer_bytes, file)))
    }
}
