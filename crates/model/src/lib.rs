//! Decal Model
//!
//! Defines the data contracts of the sticker stage:
//! - **Geometry:** sizes, offsets, and the aspect-preserving container fit
//! - **Overlay:** display sizing and drag state of the active sticker
//! - **Gallery:** the append-only list of selectable stickers
//! - **Session:** the stage state machine with stale-decode protection
//!
//! All positions are in display-space pixels relative to the container's
//! top-left corner.

pub mod gallery;
pub mod geometry;
pub mod overlay;
pub mod session;
pub mod source;
pub mod transform;

pub use gallery::*;
pub use geometry::*;
pub use overlay::*;
pub use session::*;
pub use source::*;
pub use transform::*;
