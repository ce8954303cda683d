//! Core types for emote variation.

use crate::error::{EmoteError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image encodings understood by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format. Recognised in results, never accepted as an upload.
    WebP,
}

impl ImageFormat {
    /// Encodings a source emote may be uploaded in.
    pub const ACCEPTED_UPLOADS: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::Jpeg];

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }

    /// Returns true if uploads in this format are accepted.
    pub fn is_accepted_upload(&self) -> bool {
        Self::ACCEPTED_UPLOADS.contains(self)
    }
}

/// Output resolution of generated variations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VariationSize {
    /// 256x256 pixels.
    #[default]
    #[serde(rename = "256x256")]
    Small,
    /// 512x512 pixels.
    #[serde(rename = "512x512")]
    Medium,
    /// 1024x1024 pixels.
    #[serde(rename = "1024x1024")]
    Large,
}

impl VariationSize {
    /// All sizes, smallest first.
    pub const ALL: [VariationSize; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Returns the size as the wire string (e.g., "512x512").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "256x256",
            Self::Medium => "512x512",
            Self::Large => "1024x1024",
        }
    }

    /// Returns the edge length in pixels.
    pub fn pixels(&self) -> u32 {
        match self {
            Self::Small => 256,
            Self::Medium => 512,
            Self::Large => 1024,
        }
    }
}

impl std::fmt::Display for VariationSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VariationSize {
    type Err = EmoteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| {
                EmoteError::InvalidRequest(format!(
                    "unsupported size '{s}' (expected 256x256, 512x512 or 1024x1024)"
                ))
            })
    }
}

/// Number of variations requested per source emote, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct VariationCount(u8);

impl VariationCount {
    /// Smallest allowed count.
    pub const MIN: u8 = 1;
    /// Largest allowed count.
    pub const MAX: u8 = 5;
    /// Count used when none is chosen.
    pub const DEFAULT: u8 = 3;

    /// Creates a count, rejecting values outside 1..=5.
    pub fn new(count: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(EmoteError::InvalidRequest(format!(
                "variation count must be between {} and {}, got {count}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Returns the count as a plain integer.
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for VariationCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u8> for VariationCount {
    type Error = EmoteError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<VariationCount> for u8 {
    fn from(count: VariationCount) -> Self {
        count.0
    }
}

impl std::fmt::Display for VariationCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An uploaded source emote: display name plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    name: String,
    data: Vec<u8>,
    format: ImageFormat,
}

impl SourceImage {
    /// Creates a source image, requiring an accepted encoding.
    ///
    /// The encoding is taken from the name's extension when it has one and
    /// must agree with the magic bytes when those are recognisable.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let by_extension = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension);
        let by_magic = ImageFormat::from_magic_bytes(&data);

        let format = match (by_extension, by_magic) {
            (Some(ext), Some(magic)) if ext != magic => None,
            (Some(ext), _) => Some(ext),
            (None, magic) => magic,
        };

        match format {
            Some(format) if format.is_accepted_upload() => Ok(Self { name, data, format }),
            _ => Err(EmoteError::UnsupportedEncoding(name)),
        }
    }

    /// Reads a source image from disk, named after its file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let data = std::fs::read(path)?;
        Self::new(name, data)
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the detected encoding.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Returns the display name without its extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }
}

/// Locator for one generated variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ImageRef {
    /// Remote URL, usually short-lived.
    Url(String),
    /// Inline `data:` URL built from a base64 payload.
    DataUrl(String),
}

impl ImageRef {
    /// Builds an inline reference from base64-encoded PNG data.
    pub fn from_base64_png(b64: &str) -> Self {
        Self::DataUrl(format!("data:{};base64,{}", ImageFormat::Png.mime_type(), b64))
    }

    /// Returns the locator string, usable as an `<img src>`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(s) | Self::DataUrl(s) => s,
        }
    }

    /// Decodes the payload of a `data:` reference.
    pub fn decode_inline(&self) -> Option<Result<Vec<u8>>> {
        use base64::Engine;

        let Self::DataUrl(url) = self else {
            return None;
        };
        let payload = match url.find(";base64,") {
            Some(pos) => &url[pos + 8..],
            None => return Some(Err(EmoteError::Decode("data URL is not base64".into()))),
        };
        Some(
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| EmoteError::Decode(e.to_string())),
        )
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::DataUrl(url) => {
                let head: String = url.chars().take(32).collect();
                write!(f, "{head}… ({} bytes inline)", url.len())
            }
        }
    }
}

/// A downloaded variation, ready to be written to disk.
#[derive(Debug, Clone)]
#[must_use = "downloaded image should be saved or processed"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
}

impl GeneratedImage {
    /// Wraps downloaded bytes, detecting the format from magic bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let format = ImageFormat::from_magic_bytes(&data).unwrap_or_default();
        Self { data, format }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"short"), None);
    }

    #[test]
    fn test_accepted_uploads() {
        assert!(ImageFormat::Png.is_accepted_upload());
        assert!(ImageFormat::Jpeg.is_accepted_upload());
        assert!(!ImageFormat::WebP.is_accepted_upload());
    }

    #[test]
    fn test_size_parse_and_display() {
        assert_eq!("512x512".parse::<VariationSize>().unwrap(), VariationSize::Medium);
        assert_eq!(VariationSize::Large.to_string(), "1024x1024");
        assert_eq!(VariationSize::default(), VariationSize::Small);
        assert!("128x128".parse::<VariationSize>().is_err());
    }

    #[test]
    fn test_size_serde_uses_wire_names() {
        let json = serde_json::to_string(&VariationSize::Medium).unwrap();
        assert_eq!(json, "\"512x512\"");
    }

    #[test]
    fn test_count_bounds() {
        assert_eq!(VariationCount::default().get(), 3);
        assert!(VariationCount::new(0).is_err());
        assert!(VariationCount::new(6).is_err());
        for n in 1..=5 {
            assert_eq!(VariationCount::new(n).unwrap().get(), n);
        }
        assert!(serde_json::from_str::<VariationCount>("9").is_err());
    }

    #[test]
    fn test_source_image_accepts_png_and_jpeg() {
        let png = SourceImage::new("smile.png", PNG_MAGIC.to_vec()).unwrap();
        assert_eq!(png.format(), ImageFormat::Png);
        assert_eq!(png.stem(), "smile");

        let jpeg = SourceImage::new("wink.JPG", JPEG_MAGIC.to_vec()).unwrap();
        assert_eq!(jpeg.format(), ImageFormat::Jpeg);

        // No extension: magic bytes decide.
        let bare = SourceImage::new("pasted", PNG_MAGIC.to_vec()).unwrap();
        assert_eq!(bare.format(), ImageFormat::Png);
    }

    #[test]
    fn test_source_image_rejects_other_encodings() {
        assert!(matches!(
            SourceImage::new("anim.webp", WEBP_MAGIC.to_vec()),
            Err(EmoteError::UnsupportedEncoding(_))
        ));
        assert!(matches!(
            SourceImage::new("notes.txt", b"hello world!".to_vec()),
            Err(EmoteError::UnsupportedEncoding(_))
        ));
        // Extension and content disagree.
        assert!(SourceImage::new("fake.png", JPEG_MAGIC.to_vec()).is_err());
    }

    #[test]
    fn test_image_ref_inline_decoding() {
        let inline = ImageRef::from_base64_png("AQID");
        assert!(inline.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(inline.decode_inline().unwrap().unwrap(), vec![1, 2, 3]);

        let url = ImageRef::Url("https://example.com/a.png".into());
        assert!(url.decode_inline().is_none());
        assert_eq!(url.to_string(), "https://example.com/a.png");
    }

    #[test]
    fn test_generated_image_detects_format() {
        let image = GeneratedImage::from_bytes(JPEG_MAGIC.to_vec());
        assert_eq!(image.format, ImageFormat::Jpeg);
        assert_eq!(image.size(), 12);
    }
}
