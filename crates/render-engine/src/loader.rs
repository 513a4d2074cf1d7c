//! Event handlers that pair session transitions with image probing.
//!
//! Each handler starts the transition, awaits the probe, then completes
//! or fails it with the ticket it was issued. Callers that interleave
//! several loads can drive [`Session`] directly with the same tickets;
//! stale completions are dropped there.

use decal_common::error::{DecalError, DecalResult};
use decal_model::geometry::Dimensions;
use decal_model::session::Session;
use decal_model::source::SourceRef;

use crate::decode;

/// Outcome of a load whose result may have been superseded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOutcome {
    /// The measured size was applied to the session.
    Applied(Dimensions),
    /// A newer load or selection won; the result was dropped.
    Superseded,
}

/// Upload a new base image.
pub async fn load_base(session: &mut Session, source: SourceRef) -> DecalResult<LoadOutcome> {
    let ticket = session.begin_base_load(source.clone());
    match decode::probe(&source.source).await {
        Ok(size) => Ok(if session.complete_base_load(ticket, size) {
            LoadOutcome::Applied(size)
        } else {
            LoadOutcome::Superseded
        }),
        Err(e) => {
            session.fail_base_load(ticket, &e);
            Err(e)
        }
    }
}

/// Select a gallery sticker and measure it.
pub async fn select_overlay(session: &mut Session, id: u32) -> DecalResult<LoadOutcome> {
    let ticket = session.select_overlay(id)?;
    let source = session
        .gallery()
        .get(id)
        .map(|c| c.source.source.clone())
        .ok_or(DecalError::UnknownOverlay { id })?;
    match decode::probe(&source).await {
        Ok(size) => Ok(if session.complete_overlay_probe(ticket, size) {
            LoadOutcome::Applied(size)
        } else {
            LoadOutcome::Superseded
        }),
        Err(e) => {
            session.fail_overlay_probe(ticket, &e);
            Err(e)
        }
    }
}

/// Add a custom sticker to the gallery after checking it decodes.
pub async fn add_overlay(session: &mut Session, source: SourceRef) -> DecalResult<u32> {
    if let Some(capacity) = session.gallery().capacity() {
        if session.gallery().len() >= capacity {
            return Err(DecalError::GalleryFull { capacity });
        }
    }
    decode::probe(&source.source).await?;
    session.add_overlay(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use decal_model::gallery::OverlayGallery;
    use decal_model::session::SessionState;
    use decal_model::source::ImageSource;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> SourceRef {
        let img = RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        SourceRef::local(ImageSource::from(buf))
    }

    fn session() -> Session {
        let mut s = Session::new(OverlayGallery::with_builtins(vec![png(200, 50)], Some(2)), 100.0);
        s.set_container_size(Dimensions::new(476.0, 300.0));
        s
    }

    #[tokio::test]
    async fn base_then_overlay() {
        let mut s = session();
        let outcome = load_base(&mut s, png(1000, 500)).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied(Dimensions::new(1000.0, 500.0)));

        let outcome = select_overlay(&mut s, 1).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied(Dimensions::new(200.0, 50.0)));
        assert_eq!(s.state(), SessionState::OverlayActive);
        assert_eq!(
            s.active().unwrap().display_size,
            Some(Dimensions::new(200.0, 50.0))
        );
    }

    #[tokio::test]
    async fn corrupt_base_leaves_session_empty() {
        let mut s = session();
        let bad = SourceRef::local(ImageSource::from(b"nope".to_vec()));
        let err = load_base(&mut s, bad).await.unwrap_err();
        assert!(matches!(err, DecalError::Decode { .. }));
        assert_eq!(s.state(), SessionState::Empty);
        assert!(!s.is_base_loading());
    }

    #[tokio::test]
    async fn add_overlay_validates_and_respects_capacity() {
        let mut s = session();
        let bad = SourceRef::local(ImageSource::from(b"nope".to_vec()));
        assert!(matches!(
            add_overlay(&mut s, bad).await,
            Err(DecalError::Decode { .. })
        ));
        assert_eq!(add_overlay(&mut s, png(10, 10)).await.unwrap(), 2);
        assert!(matches!(
            add_overlay(&mut s, png(10, 10)).await,
            Err(DecalError::GalleryFull { .. })
        ));
    }
}
