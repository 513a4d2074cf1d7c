//! Decal Render Engine
//!
//! Turns the interactive stage arrangement into a single flattened PNG
//! and hands it to the user.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Session ──┐
//!           ├── map_export (display space ─▶ export space)
//!           │         │
//! base ─────┼── decode ┤
//! sticker ──┘         ├── composite (base fill, overlay at offset)
//!                     │
//!                     ▼
//!                encode PNG ──▶ ExportSink ──▶ receipt.png | share
//! ```

pub mod compositor;
pub mod decode;
pub mod export;
pub mod loader;
pub mod mapper;
pub mod stickers;

pub use export::*;
