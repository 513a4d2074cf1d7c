//! Image decoding.
//!
//! Decoding is the only operation in the pipeline that suspends. The
//! async entry points run the codec on tokio's blocking pool so the
//! event loop stays responsive; the `_blocking` variants are for callers
//! that are already off the event loop.

use std::borrow::Cow;
use std::io::Cursor;

use image::{ImageFormat, ImageReader, RgbaImage};

use decal_common::error::{DecalError, DecalResult};
use decal_model::geometry::Dimensions;
use decal_model::source::ImageSource;

/// Formats accepted for base images and stickers.
const ACCEPTED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg];

/// A fully decoded RGBA image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub pixels: RgbaImage,
}

impl DecodedImage {
    /// Native pixel size.
    pub fn intrinsic_size(&self) -> Dimensions {
        Dimensions::new(self.pixels.width() as f64, self.pixels.height() as f64)
    }
}

/// Read only the header of `source` and return its pixel size.
pub async fn probe(source: &ImageSource) -> DecalResult<Dimensions> {
    let source = source.clone();
    run_blocking(move || probe_blocking(&source)).await
}

/// Fully decode `source` to RGBA.
pub async fn decode(source: &ImageSource) -> DecalResult<DecodedImage> {
    let source = source.clone();
    run_blocking(move || decode_blocking(&source)).await
}

pub fn probe_blocking(source: &ImageSource) -> DecalResult<Dimensions> {
    let bytes = read_source(source)?;
    let reader = open_reader(&bytes, source)?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecalError::decode(format!("{}: {e}", source.describe())))?;
    if width == 0 || height == 0 {
        return Err(DecalError::decode(format!(
            "{}: image has zero size",
            source.describe()
        )));
    }
    Ok(Dimensions::new(width as f64, height as f64))
}

pub fn decode_blocking(source: &ImageSource) -> DecalResult<DecodedImage> {
    let bytes = read_source(source)?;
    let reader = open_reader(&bytes, source)?;
    let image = reader
        .decode()
        .map_err(|e| DecalError::decode(format!("{}: {e}", source.describe())))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(DecalError::decode(format!(
            "{}: image has zero size",
            source.describe()
        )));
    }
    tracing::debug!(
        source = %source.describe(),
        width = image.width(),
        height = image.height(),
        "Decoded image"
    );
    Ok(DecodedImage {
        pixels: image.to_rgba8(),
    })
}

/// Any failure to obtain the bytes is a decode failure to callers.
fn read_source(source: &ImageSource) -> DecalResult<Cow<'_, [u8]>> {
    source
        .read_bytes()
        .map_err(|e| DecalError::decode(format!("cannot read {}: {e}", source.describe())))
}

fn open_reader<'a>(
    bytes: &'a [u8],
    source: &ImageSource,
) -> DecalResult<ImageReader<Cursor<&'a [u8]>>> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecalError::decode(format!("{}: {e}", source.describe())))?;
    match reader.format() {
        Some(format) if ACCEPTED_FORMATS.contains(&format) => Ok(reader),
        Some(format) => Err(DecalError::decode(format!(
            "{}: unsupported format {format:?}, expected PNG or JPEG",
            source.describe()
        ))),
        None => Err(DecalError::decode(format!(
            "{}: unrecognized image data",
            source.describe()
        ))),
    }
}

async fn run_blocking<T, F>(f: F) -> DecalResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> DecalResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DecalError::Other(anyhow::anyhow!("decode task failed: {e}")))?
}
