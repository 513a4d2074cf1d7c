//! Display-space geometry: sizes, offsets, and aspect-preserving fit.
//!
//! All values are in display-space units (CSS pixels of the interactive
//! container) unless a function says otherwise.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A non-negative width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// An unmeasured size.
    pub const ZERO: Dimensions = Dimensions {
        width: 0.0,
        height: 0.0,
    };

    /// Create a size, coercing negative or non-finite components to zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }

    /// Whether both axes are strictly positive.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// `width / height`, or `None` for a degenerate size.
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.is_measured().then(|| self.width / self.height)
    }

    /// Scale each axis independently.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.width * sx, self.height * sy)
    }

    /// Integer pixel size of a raster surface allocated for this size.
    ///
    /// Fractional sizes truncate toward zero, as a canvas element does
    /// when assigned a fractional width or height. Returns `None` if
    /// either axis ends up zero.
    pub fn surface_pixels(&self) -> Option<(u32, u32)> {
        let w = self.width.trunc();
        let h = self.height.trunc();
        if w < 1.0 || h < 1.0 || w > u32::MAX as f64 || h > u32::MAX as f64 {
            return None;
        }
        Some((w as u32, h as u32))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `476x300`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width: f64 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{w}'"))?;
        let height: f64 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{h}'"))?;
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(format!("dimensions must be non-negative, got '{s}'"));
        }
        Ok(Self { width, height })
    }
}

/// A translation in display-space pixels, relative to the container origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp so a box of `size` anchored at this offset stays inside
    /// `container`. A box larger than the container pins to the origin
    /// on that axis.
    pub fn clamped_within(&self, container: Dimensions, size: Dimensions) -> Offset {
        let max_x = (container.width - size.width).max(0.0);
        let max_y = (container.height - size.height).max(0.0);
        Offset {
            x: finite_or_zero(self.x).clamp(0.0, max_x),
            y: finite_or_zero(self.y).clamp(0.0, max_y),
        }
    }

    /// Scale each axis independently.
    pub fn scaled(&self, sx: f64, sy: f64) -> Offset {
        Offset {
            x: self.x * sx,
            y: self.y * sy,
        }
    }
}

/// Fit `intrinsic` inside `container`, preserving aspect ratio.
///
/// Fits by width first; if the resulting height overflows the container,
/// re-fits by height. The result touches the container on at least one
/// axis. Returns `None` while the container is unmeasured or the
/// intrinsic size is degenerate; callers must defer until it is known.
pub fn fit_within(container: Dimensions, intrinsic: Dimensions) -> Option<Dimensions> {
    if !container.is_measured() {
        return None;
    }
    let aspect = intrinsic.aspect_ratio()?;

    let mut width = container.width;
    let mut height = container.width / aspect;

    if height > container.height {
        height = container.height;
        width = container.height * aspect;
    }

    Some(Dimensions { width, height })
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
