//! Built-in stickers, rasterized on demand.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use decal_common::error::{DecalError, DecalResult};
use decal_model::source::{ImageSource, SourceRef};

/// Number of stickers the gallery starts with.
pub const BUILTIN_STICKER_COUNT: usize = 4;

/// The starter stickers, in gallery order (ids 1 through 4).
pub fn builtin_stickers() -> DecalResult<Vec<SourceRef>> {
    let images = [dot(96, 96), ring(120, 120), badge(160, 64), stripe(64, 128)];
    images
        .iter()
        .map(|img| encode(img).map(|bytes| SourceRef::local(ImageSource::from(bytes))))
        .collect()
}

fn encode(img: &RgbaImage) -> DecalResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| DecalError::Other(anyhow::anyhow!("failed to rasterize sticker: {e}")))?;
    Ok(buf)
}

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn dot(w: u32, h: u32) -> RgbaImage {
    let (cx, cy, r) = (w as f64 / 2.0, h as f64 / 2.0, w.min(h) as f64 / 2.0);
    RgbaImage::from_fn(w, h, |x, y| {
        let d = distance(x, y, cx, cy);
        if d <= r {
            Rgba([255, 196, 0, 255])
        } else {
            CLEAR
        }
    })
}

fn ring(w: u32, h: u32) -> RgbaImage {
    let (cx, cy, r) = (w as f64 / 2.0, h as f64 / 2.0, w.min(h) as f64 / 2.0);
    RgbaImage::from_fn(w, h, |x, y| {
        let d = distance(x, y, cx, cy);
        if d <= r && d >= r * 0.7 {
            Rgba([108, 200, 253, 255])
        } else {
            CLEAR
        }
    })
}

fn badge(w: u32, h: u32) -> RgbaImage {
    let border = 4;
    RgbaImage::from_fn(w, h, |x, y| {
        if x < border || y < border || x >= w - border || y >= h - border {
            Rgba([0, 161, 251, 255])
        } else {
            Rgba([245, 248, 255, 230])
        }
    })
}

fn stripe(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        if (x + y) / 16 % 2 == 0 {
            Rgba([235, 64, 90, 255])
        } else {
            CLEAR
        }
    })
}

fn distance(x: u32, y: u32, cx: f64, cy: f64) -> f64 {
    let dx = x as f64 + 0.5 - cx;
    let dy = y as f64 + 0.5 - cy;
    (dx * dx + dy * dy).sqrt()
}
