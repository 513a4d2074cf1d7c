//! Overlay layout: display sizing and drag state of the active sticker.

use serde::{Deserialize, Serialize};

use crate::geometry::{Dimensions, Offset};

/// Default cap on the overlay's displayed height.
pub const DEFAULT_OVERLAY_MAX_HEIGHT: f64 = 100.0;

/// Display size of an overlay with the given intrinsic size.
///
/// `height = min(max_height, intrinsic.height)` and the width follows
/// the intrinsic aspect ratio. Overlays shorter than the cap pass through
/// at their natural size. Returns `None` for a degenerate intrinsic size.
pub fn overlay_display_size(intrinsic: Dimensions, max_height: f64) -> Option<Dimensions> {
    let aspect = intrinsic.aspect_ratio()?;
    let height = intrinsic.height.min(max_height.max(0.0));
    Some(Dimensions::new(height * aspect, height))
}

/// The one overlay currently placed on the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveOverlay {
    /// Gallery id of the selected overlay.
    pub id: u32,

    /// Display size; `None` until the overlay's dimensions are probed.
    pub display_size: Option<Dimensions>,

    /// Drag translation from the container origin.
    pub offset: Offset,
}

impl ActiveOverlay {
    /// A freshly selected overlay: anchored at the origin, size unknown.
    pub fn selected(id: u32) -> Self {
        Self {
            id,
            display_size: None,
            offset: Offset::ZERO,
        }
    }

    /// Whether the display size has been measured.
    pub fn is_ready(&self) -> bool {
        self.display_size.is_some()
    }

    /// Move to `offset`, constrained to keep the overlay inside `container`.
    ///
    /// There is no inertia: the value stored here is exactly where the
    /// overlay rests after release.
    pub fn move_to(&mut self, offset: Offset, container: Dimensions) {
        let size = self.display_size.unwrap_or(Dimensions::ZERO);
        self.offset = offset.clamped_within(container, size);
    }
}
