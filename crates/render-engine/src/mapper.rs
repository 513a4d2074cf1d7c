//! Display-space to export-space placement.
//!
//! With [`ExportResolution::Display`] the export canvas is the base
//! image's fitted display size, which is the same coordinate system the
//! overlay offset was measured in, so placement passes through unscaled.
//! [`ExportResolution::Native`] renders at the base image's intrinsic
//! size and scales overlay placement by the display-to-native ratio.

use decal_common::config::ExportResolution;
use decal_common::error::{DecalError, DecalResult};
use decal_model::geometry::{Dimensions, Offset};
use decal_model::session::Session;
use decal_model::source::SourceRef;

/// Where and how big the overlay lands on the export canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlacement {
    pub source: SourceRef,
    pub offset: Offset,
    pub size: Dimensions,
}

/// Everything the compositor needs, detached from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    /// Output canvas size in export pixels.
    pub canvas: Dimensions,

    pub base: SourceRef,

    /// `None` when no overlay is active; the export is then base-only.
    pub overlay: Option<OverlayPlacement>,
}

/// Build an export plan from the session's current state.
///
/// Fails with `GeometryNotReady` if the base image is absent or its
/// display size is not known yet, or if a selected overlay has not been
/// measured. Never produces a zero-size canvas.
pub fn map_export(session: &Session, resolution: ExportResolution) -> DecalResult<ExportPlan> {
    let base = session
        .base()
        .ok_or_else(|| DecalError::geometry_not_ready("no base image has been loaded"))?;
    let display = base
        .display_size
        .filter(Dimensions::is_measured)
        .ok_or_else(|| {
            DecalError::geometry_not_ready("base image display size is not known yet")
        })?;

    let (canvas, scale_x, scale_y) = match resolution {
        ExportResolution::Display => (display, 1.0, 1.0),
        ExportResolution::Native => {
            let native = base.intrinsic_size;
            (
                native,
                native.width / display.width,
                native.height / display.height,
            )
        }
    };
    if canvas.surface_pixels().is_none() {
        return Err(DecalError::geometry_not_ready(format!(
            "export canvas {canvas} is smaller than one pixel"
        )));
    }

    let overlay = match session.active() {
        None => None,
        Some(active) => {
            let size = active.display_size.ok_or_else(|| {
                DecalError::geometry_not_ready(format!("overlay {} is still loading", active.id))
            })?;
            let candidate = session
                .gallery()
                .get(active.id)
                .ok_or(DecalError::UnknownOverlay { id: active.id })?;
            Some(OverlayPlacement {
                source: candidate.source.clone(),
                offset: active.offset.scaled(scale_x, scale_y),
                size: size.scaled(scale_x, scale_y),
            })
        }
    };

    tracing::debug!(
        canvas = %canvas,
        ?resolution,
        overlay = ?overlay.as_ref().map(|o| (o.offset, o.size)),
        "Mapped export placement"
    );

    Ok(ExportPlan {
        canvas,
        base: base.source.clone(),
        overlay,
    })
}
