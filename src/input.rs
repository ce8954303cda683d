//! Collects uploads and shared settings into a submittable batch.

use crate::batch::VariationBatch;
use crate::error::{EmoteError, Result};
use crate::image::{SourceImage, VariationCount, VariationSize};
use std::path::Path;

/// Gathers source emotes plus the count and size shared by the whole batch.
///
/// Nothing is sent anywhere until [`InputCollector::submit`] is called.
///
/// ```
/// use emotegen::{InputCollector, VariationSize};
///
/// let collector = InputCollector::new().with_size(VariationSize::Medium);
/// assert!(collector.submit().is_err()); // nothing uploaded yet
/// ```
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    uploads: Vec<SourceImage>,
    count: VariationCount,
    size: VariationSize,
}

impl InputCollector {
    /// Creates an empty collector with the default count (3) and size (256x256).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of variations per emote.
    pub fn with_count(mut self, count: VariationCount) -> Self {
        self.count = count;
        self
    }

    /// Sets the output size.
    pub fn with_size(mut self, size: VariationSize) -> Self {
        self.size = size;
        self
    }

    /// Adds an already-decoded upload.
    pub fn add(&mut self, image: SourceImage) -> &mut Self {
        self.uploads.push(image);
        self
    }

    /// Adds raw upload bytes under a display name.
    ///
    /// Fails with [`EmoteError::UnsupportedEncoding`] unless the bytes are PNG
    /// or JPEG.
    pub fn add_bytes(&mut self, name: impl Into<String>, data: Vec<u8>) -> Result<&mut Self> {
        let image = SourceImage::new(name, data)?;
        Ok(self.add(image))
    }

    /// Reads an upload from disk.
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let image = SourceImage::from_path(path)?;
        Ok(self.add(image))
    }

    /// Returns the uploads collected so far.
    pub fn uploads(&self) -> &[SourceImage] {
        &self.uploads
    }

    /// Returns the shared variation count.
    pub fn count(&self) -> VariationCount {
        self.count
    }

    /// Returns the shared output size.
    pub fn size(&self) -> VariationSize {
        self.size
    }

    /// Triggers generation, producing the batch to run.
    ///
    /// Fails fast with [`EmoteError::NoInput`] when nothing was uploaded.
    pub fn submit(self) -> Result<VariationBatch> {
        if self.uploads.is_empty() {
            return Err(EmoteError::NoInput);
        }
        Ok(VariationBatch::new(self.uploads, self.count, self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{png_source, PNG_MAGIC};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let collector = InputCollector::new();
        assert_eq!(collector.count().get(), 3);
        assert_eq!(collector.size(), VariationSize::Small);
        assert!(collector.uploads().is_empty());
    }

    #[test]
    fn test_submit_without_uploads_is_no_input() {
        let err = InputCollector::new().submit().unwrap_err();
        assert!(matches!(err, EmoteError::NoInput));
        assert_eq!(
            err.to_string(),
            "Please upload at least one emote to get started."
        );
    }

    #[test]
    fn test_submit_carries_shared_settings() {
        let mut collector = InputCollector::new()
            .with_count(VariationCount::new(5).unwrap())
            .with_size(VariationSize::Large);
        collector.add(png_source("a.png")).add(png_source("b.png"));

        let batch = collector.submit().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.count().get(), 5);
        assert_eq!(batch.size(), VariationSize::Large);
        let names: Vec<&str> = batch.sources().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }

    #[test]
    fn test_add_bytes_rejects_unsupported_encoding() {
        let mut collector = InputCollector::new();
        let err = collector
            .add_bytes("anim.gif", b"GIF89a\0\0\0\0\0\0".to_vec())
            .unwrap_err();
        assert!(matches!(err, EmoteError::UnsupportedEncoding(name) if name == "anim.gif"));
        assert!(collector.uploads().is_empty());
    }

    #[test]
    fn test_add_path_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&PNG_MAGIC).unwrap();

        let mut collector = InputCollector::new();
        collector.add_path(file.path()).unwrap();

        let upload = &collector.uploads()[0];
        assert!(upload.name().ends_with(".png"));
        assert_eq!(upload.data(), &PNG_MAGIC);
    }

    #[test]
    fn test_add_path_missing_file() {
        let mut collector = InputCollector::new();
        let err = collector.add_path("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, EmoteError::Io(_)));
    }
}
