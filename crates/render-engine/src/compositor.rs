//! Raster compositor: flattens base image and overlay onto one surface.
//!
//! The draw order is fixed: base image scaled to fill the whole surface,
//! then the overlay (if any) at its mapped offset and size. Off-canvas
//! overlay regions clip. Nothing is cached between calls, so two exports
//! of the same plan produce identical pixels.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};

use decal_common::config::ResizeFilter;
use decal_common::error::{DecalError, DecalResult};

use crate::decode::{self, DecodedImage};
use crate::mapper::ExportPlan;

/// MIME type of encoded surfaces.
pub const PNG_MIME: &str = "image/png";

/// An off-screen drawing surface.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
    tainted: bool,
    overlay_drawn: bool,
}

impl Surface {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Whether an overlay was actually drawn. `false` when the plan had
    /// none, or it failed to decode, or it rounded to zero pixels.
    pub fn has_overlay(&self) -> bool {
        self.overlay_drawn
    }

    /// Whether a cross-origin source was drawn onto this surface.
    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    /// Read the pixels back. Fails on a tainted surface.
    pub fn pixels(&self) -> DecalResult<&RgbaImage> {
        if self.tainted {
            return Err(DecalError::export_blocked(
                "surface contains cross-origin pixels and cannot be read",
            ));
        }
        Ok(&self.pixels)
    }

    /// Encode as PNG. Fails on a tainted surface instead of returning
    /// blank output.
    pub fn encode_png(&self) -> DecalResult<Vec<u8>> {
        let pixels = self.pixels()?;
        let mut buf = Vec::new();
        pixels
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| DecalError::Other(anyhow::anyhow!("PNG encoding failed: {e}")))?;
        Ok(buf)
    }
}

/// Decode the plan's sources afresh and composite them.
///
/// A base that fails to decode aborts the export. An overlay that fails
/// to decode is skipped with a warning and the base is exported alone.
pub async fn composite(plan: &ExportPlan, filter: ResizeFilter) -> DecalResult<Surface> {
    let base = decode::decode(&plan.base.source).await?;
    let overlay = match &plan.overlay {
        Some(placement) => match decode::decode(&placement.source.source).await {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(error = %e, "Overlay could not be decoded; exporting base only");
                None
            }
        },
        None => None,
    };
    composite_decoded(plan, &base, overlay.as_ref(), filter)
}

/// Composite already-decoded images according to `plan`.
///
/// `overlay` is ignored when the plan has no overlay placement.
pub fn composite_decoded(
    plan: &ExportPlan,
    base: &DecodedImage,
    overlay: Option<&DecodedImage>,
    filter: ResizeFilter,
) -> DecalResult<Surface> {
    let (width, height) = plan.canvas.surface_pixels().ok_or_else(|| {
        DecalError::geometry_not_ready(format!("cannot allocate a {} surface", plan.canvas))
    })?;
    let filter = filter_type(filter);

    let mut canvas = scale_to(&base.pixels, width, height, filter);
    let mut tainted = !plan.base.origin.is_readable();
    let mut overlay_drawn = false;

    if let (Some(placement), Some(overlay)) = (&plan.overlay, overlay) {
        let ow = placement.size.width.round();
        let oh = placement.size.height.round();
        if ow >= 1.0 && oh >= 1.0 {
            let scaled = scale_to(&overlay.pixels, ow as u32, oh as u32, filter);
            imageops::overlay(
                &mut canvas,
                &scaled,
                placement.offset.x.round() as i64,
                placement.offset.y.round() as i64,
            );
            tainted |= !placement.source.origin.is_readable();
            overlay_drawn = true;
        } else {
            tracing::debug!(size = %placement.size, "Overlay rounds to zero pixels; skipped");
        }
    }

    tracing::debug!(width, height, tainted, overlay_drawn, "Composited surface");
    Ok(Surface {
        pixels: canvas,
        tainted,
        overlay_drawn,
    })
}

fn scale_to(src: &RgbaImage, width: u32, height: u32, filter: FilterType) -> RgbaImage {
    if src.width() == width && src.height() == height {
        src.clone()
    } else {
        imageops::resize(src, width, height, filter)
    }
}

fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Triangle => FilterType::Triangle,
        ResizeFilter::CatmullRom => FilterType::CatmullRom,
        ResizeFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decal_model::geometry::{Dimensions, Offset};
    use decal_model::source::{ImageSource, Origin, SourceRef};
    use image::Rgba;

    use crate::mapper::OverlayPlacement;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> DecodedImage {
        DecodedImage {
            pixels: RgbaImage::from_pixel(width, height, color),
        }
    }

    fn plan(canvas: Dimensions, overlay: Option<OverlayPlacement>) -> ExportPlan {
        ExportPlan {
            canvas,
            base: SourceRef::local(ImageSource::from(vec![0])),
            overlay,
        }
    }

    fn placement(offset: Offset, size: Dimensions, origin: Origin) -> OverlayPlacement {
        OverlayPlacement {
            source: SourceRef::with_origin(ImageSource::from(vec![1]), origin),
            offset,
            size,
        }
    }

    #[test]
    fn base_fills_surface() {
        let surface = composite_decoded(
            &plan(Dimensions::new(47.0, 23.0), None),
            &solid(100, 50, RED),
            None,
            ResizeFilter::Nearest,
        )
        .unwrap();
        assert_eq!((surface.width(), surface.height()), (47, 23));
        let pixels = surface.pixels().unwrap();
        assert!(pixels.pixels().all(|p| *p == RED));
    }

    #[test]
    fn overlay_lands_at_offset() {
        let p = plan(
            Dimensions::new(40.0, 20.0),
            Some(placement(
                Offset::new(10.0, 5.0),
                Dimensions::new(4.0, 2.0),
                Origin::SameOrigin,
            )),
        );
        let surface =
            composite_decoded(&p, &solid(40, 20, RED), Some(&solid(8, 4, BLUE)), ResizeFilter::Nearest)
                .unwrap();
        let pixels = surface.pixels().unwrap();
        assert_eq!(*pixels.get_pixel(10, 5), BLUE);
        assert_eq!(*pixels.get_pixel(13, 6), BLUE);
        assert_eq!(*pixels.get_pixel(14, 5), RED);
        assert_eq!(*pixels.get_pixel(9, 5), RED);
        assert!(surface.has_overlay());
    }

    #[test]
    fn planned_overlay_without_pixels_is_not_drawn() {
        let p = plan(
            Dimensions::new(10.0, 10.0),
            Some(placement(
                Offset::ZERO,
                Dimensions::new(2.0, 2.0),
                Origin::SameOrigin,
            )),
        );
        let surface = composite_decoded(&p, &solid(10, 10, RED), None, ResizeFilter::Nearest).unwrap();
        assert!(!surface.has_overlay());
        assert!(surface.pixels().unwrap().pixels().all(|px| *px == RED));

        let tiny = plan(
            Dimensions::new(10.0, 10.0),
            Some(placement(
                Offset::ZERO,
                Dimensions::new(0.4, 0.4),
                Origin::SameOrigin,
            )),
        );
        let surface =
            composite_decoded(&tiny, &solid(10, 10, RED), Some(&solid(2, 2, BLUE)), ResizeFilter::Nearest)
                .unwrap();
        assert!(!surface.has_overlay());
    }

    #[test]
    fn off_canvas_overlay_clips() {
        let p = plan(
            Dimensions::new(10.0, 10.0),
            Some(placement(
                Offset::new(8.0, -2.0),
                Dimensions::new(4.0, 4.0),
                Origin::SameOrigin,
            )),
        );
        let surface =
            composite_decoded(&p, &solid(10, 10, RED), Some(&solid(4, 4, BLUE)), ResizeFilter::Nearest)
                .unwrap();
        let pixels = surface.pixels().unwrap();
        assert_eq!(*pixels.get_pixel(9, 0), BLUE);
        assert_eq!(*pixels.get_pixel(9, 1), BLUE);
        assert_eq!(*pixels.get_pixel(9, 2), RED);
        assert_eq!(*pixels.get_pixel(7, 0), RED);
    }

    #[test]
    fn cross_origin_overlay_blocks_readback() {
        let p = plan(
            Dimensions::new(10.0, 10.0),
            Some(placement(
                Offset::ZERO,
                Dimensions::new(2.0, 2.0),
                Origin::CrossOrigin,
            )),
        );
        let surface =
            composite_decoded(&p, &solid(10, 10, RED), Some(&solid(2, 2, BLUE)), ResizeFilter::Nearest)
                .unwrap();
        assert!(surface.is_tainted());
        assert!(matches!(
            surface.encode_png(),
            Err(DecalError::ExportBlocked { .. })
        ));
    }

    #[test]
    fn cors_enabled_overlay_stays_readable() {
        let p = plan(
            Dimensions::new(10.0, 10.0),
            Some(placement(
                Offset::ZERO,
                Dimensions::new(2.0, 2.0),
                Origin::CorsEnabled,
            )),
        );
        let surface =
            composite_decoded(&p, &solid(10, 10, RED), Some(&solid(2, 2, BLUE)), ResizeFilter::Nearest)
                .unwrap();
        assert!(!surface.is_tainted());
        assert!(surface.encode_png().is_ok());
    }

    #[test]
    fn fractional_canvas_truncates() {
        let surface = composite_decoded(
            &plan(Dimensions::new(150.7, 300.2), None),
            &solid(5, 10, RED),
            None,
            ResizeFilter::Triangle,
        )
        .unwrap();
        assert_eq!((surface.width(), surface.height()), (150, 300));
    }
}
