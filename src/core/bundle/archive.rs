use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::BuilderResult;

/// The output archive being assembled, kept in memory until compression.
///
/// Only the single in-flight pipeline appends to it; entries keep their
/// insertion order so the finished zip lists the jar first and config
/// files last, like the original bundles.
#[derive(Debug, Default)]
pub struct BundleArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl BundleArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at the archive root.
    pub fn add_root(&mut self, filename: &str, bytes: Vec<u8>) {
        self.entries.push((filename.to_string(), bytes));
    }

    /// Add a file under `folder` (empty folder means the root).
    pub fn add(&mut self, folder: &str, filename: &str, bytes: Vec<u8>) {
        if folder.is_empty() {
            self.add_root(filename, bytes);
        } else {
            let folder = folder.trim_end_matches('/');
            self.entries.push((format!("{}/{}", folder, filename), bytes));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|(p, _)| p == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|(p, _)| p.as_str()).collect()
    }

    /// Serialize the whole archive into one deflate-compressed zip blob,
    /// reporting percent-complete per entry written.
    pub fn compress<F>(&self, mut on_progress: F) -> BuilderResult<Vec<u8>>
    where
        F: FnMut(u8),
    {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6));

        let total = self.entries.len().max(1);
        for (i, (path, bytes)) in self.entries.iter().enumerate() {
            writer.start_file(path.as_str(), options)?;
            writer.write_all(bytes)?;
            on_progress((((i + 1) * 100) / total) as u8);
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}
