//! Image sources handed to the stage by upload and gallery collaborators.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use decal_common::error::{DecalError, DecalResult};

/// MIME types accepted from the upload collaborator.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Raw image data in one of the shapes a collaborator may supply.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `data:<mime>;base64,<payload>`, as produced by a file reader.
    DataUrl(String),
    /// Encoded image bytes already in memory.
    Bytes(Arc<[u8]>),
    /// An encoded image on disk, read fresh on every decode.
    File(PathBuf),
}

impl ImageSource {
    /// Build a data URL source from uploaded bytes, rejecting anything
    /// that is not PNG or JPEG.
    pub fn from_upload(bytes: &[u8], mime: &str) -> DecalResult<Self> {
        if !ACCEPTED_MIME_TYPES.contains(&mime) {
            return Err(DecalError::invalid_source(format!(
                "unsupported upload type '{mime}', expected image/png or image/jpeg"
            )));
        }
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Self::DataUrl(format!("data:{mime};base64,{payload}")))
    }

    /// Read the encoded bytes behind this source.
    pub fn read_bytes(&self) -> DecalResult<Cow<'_, [u8]>> {
        match self {
            Self::Bytes(bytes) => Ok(Cow::Borrowed(&bytes[..])),
            Self::DataUrl(url) => decode_data_url(url).map(Cow::Owned),
            Self::File(path) => {
                if !path.exists() {
                    return Err(DecalError::FileNotFound { path: path.clone() });
                }
                Ok(Cow::Owned(std::fs::read(path)?))
            }
        }
    }

    /// Short description for logs; never includes payload bytes.
    pub fn describe(&self) -> String {
        match self {
            Self::DataUrl(url) => {
                let header = url.split(',').next().unwrap_or("data:");
                format!("{header} ({} chars)", url.len())
            }
            Self::Bytes(bytes) => format!("{} bytes in memory", bytes.len()),
            Self::File(path) => path.display().to_string(),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageSource({})", self.describe())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

/// Where a source came from, relative to the stage.
///
/// Drawing a `CrossOrigin` source taints the export surface, and a
/// tainted surface cannot be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    SameOrigin,
    CorsEnabled,
    CrossOrigin,
}

impl Origin {
    /// Whether pixels from this origin may be read back after drawing.
    pub fn is_readable(self) -> bool {
        !matches!(self, Origin::CrossOrigin)
    }
}

/// A source together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub source: ImageSource,
    pub origin: Origin,
}

impl SourceRef {
    /// A same-origin source, the case for uploads and bundled stickers.
    pub fn local(source: impl Into<ImageSource>) -> Self {
        Self {
            source: source.into(),
            origin: Origin::SameOrigin,
        }
    }

    pub fn with_origin(source: impl Into<ImageSource>, origin: Origin) -> Self {
        Self {
            source: source.into(),
            origin,
        }
    }
}

fn decode_data_url(url: &str) -> DecalResult<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| DecalError::invalid_source("data URL must start with 'data:'"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecalError::invalid_source("data URL has no payload separator"))?;
    if !meta.split(';').any(|part| part == "base64") {
        return Err(DecalError::invalid_source(
            "only base64-encoded data URLs are supported",
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| DecalError::invalid_source(format!("bad base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_round_trips_through_data_url() {
        let source = ImageSource::from_upload(b"\x89PNG fake", "image/png").unwrap();
        match &source {
            ImageSource::DataUrl(url) => assert!(url.starts_with("data:image/png;base64,")),
            other => panic!("unexpected source {other:?}"),
        }
        assert_eq!(&source.read_bytes().unwrap()[..], b"\x89PNG fake");
    }

    #[test]
    fn upload_rejects_other_types() {
        let err = ImageSource::from_upload(b"GIF89a", "image/gif").unwrap_err();
        assert!(matches!(err, DecalError::InvalidSource { .. }));
    }

    #[test]
    fn malformed_data_urls_are_rejected() {
        for url in ["image/png;base64,AAAA", "data:image/png;base64", "data:text/plain,hi"] {
            let err = ImageSource::DataUrl(url.to_string()).read_bytes().unwrap_err();
            assert!(matches!(err, DecalError::InvalidSource { .. }), "{url}");
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let path = PathBuf::from("/definitely/not/here.png");
        let err = ImageSource::File(path.clone()).read_bytes().unwrap_err();
        assert!(matches!(err, DecalError::FileNotFound { path: p } if p == path));
    }

    #[test]
    fn describe_hides_payload() {
        let source = ImageSource::DataUrl("data:image/png;base64,QUJD".to_string());
        assert_eq!(source.describe(), "data:image/png;base64 (26 chars)");
    }

    #[test]
    fn cross_origin_is_not_readable() {
        assert!(Origin::SameOrigin.is_readable());
        assert!(Origin::CorsEnabled.is_readable());
        assert!(!Origin::CrossOrigin.is_readable());
    }
}
