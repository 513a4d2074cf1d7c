//! Interop with CSS-style transform strings.
//!
//! The stage reads the overlay offset directly from [`ActiveOverlay`].
//! These helpers exist for clients that render the overlay with a
//! `translateX(..px) translateY(..px)` style and hand that string back.
//!
//! [`ActiveOverlay`]: crate::overlay::ActiveOverlay

use once_cell::sync::Lazy;
use regex::Regex;

use crate::geometry::Offset;

static TRANSLATE_X: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"translateX\((.*?)px\)").expect("static regex"));
static TRANSLATE_Y: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"translateY\((.*?)px\)").expect("static regex"));
static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("static regex")
});

impl Offset {
    /// Render as a CSS transform, e.g. `translateX(12px) translateY(-5px)`.
    pub fn css_transform(&self) -> String {
        format!("translateX({}px) translateY({}px)", self.x, self.y)
    }
}

/// Recover an offset from a rendered transform string.
///
/// Each axis is read independently. A missing, unparseable, or
/// non-finite component is `0`. A transform containing `none`
/// (no active translation) is `{0, 0}`, as is an absent transform.
pub fn parse_transform_offset(transform: Option<&str>) -> Offset {
    let Some(transform) = transform else {
        return Offset::ZERO;
    };
    if transform.contains("none") {
        return Offset::ZERO;
    }
    Offset {
        x: axis_value(&TRANSLATE_X, transform),
        y: axis_value(&TRANSLATE_Y, transform),
    }
}

fn axis_value(pattern: &Regex, transform: &str) -> f64 {
    pattern
        .captures(transform)
        .and_then(|caps| caps.get(1))
        .and_then(|m| leading_float(m.as_str()))
        .unwrap_or(0.0)
}

/// Parse the longest numeric prefix, ignoring trailing garbage.
fn leading_float(s: &str) -> Option<f64> {
    let m = LEADING_FLOAT.find(s)?;
    m.as_str()
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
