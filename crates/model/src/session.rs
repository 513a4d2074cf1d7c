//! Stage session: the single owner of base image, gallery, and active overlay.
//!
//! The session is driven by discrete events (upload, selection, drag,
//! container resize). Image decoding happens outside the session; a
//! caller starts a load, receives a [`DecodeTicket`], decodes, and hands
//! the measured size back with the ticket. Completions whose ticket has
//! been superseded by a newer load or selection are ignored, so a slow
//! decode can never overwrite a newer one's result.
//!
//! ```text
//! Empty ──upload──▶ BaseLoaded ──select──▶ OverlayActive ◀──▶ Dragging
//! ```
//!
//! Export is a query from any state at or past `BaseLoaded`, never a
//! transition.

use serde::Serialize;

use decal_common::config::AppConfig;
use decal_common::error::{DecalError, DecalResult};

use crate::gallery::OverlayGallery;
use crate::geometry::{fit_within, Dimensions, Offset};
use crate::overlay::{overlay_display_size, ActiveOverlay};
use crate::source::SourceRef;

/// Coarse session state, derived from the session's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    BaseLoaded,
    OverlayActive,
    Dragging,
}

/// What a pending decode is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeTarget {
    Base,
    Overlay { id: u32 },
}

/// Proof of a started decode. Only the most recent ticket per target
/// is honored on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTicket {
    pub target: DecodeTarget,
    generation: u64,
}

/// The user-selected background picture.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseImage {
    pub source: SourceRef,

    /// Native pixel size.
    pub intrinsic_size: Dimensions,

    /// Fitted size inside the container; `None` until the container
    /// has been measured.
    pub display_size: Option<Dimensions>,
}

#[derive(Debug, Clone)]
struct PendingBase {
    generation: u64,
    source: SourceRef,
}

/// Interactive compositing session.
#[derive(Debug, Clone)]
pub struct Session {
    container: Option<Dimensions>,
    overlay_max_height: f64,
    base: Option<BaseImage>,
    pending_base: Option<PendingBase>,
    gallery: OverlayGallery,
    active: Option<ActiveOverlay>,
    overlay_generation: u64,
    next_generation: u64,
    dragging: bool,
}

impl Session {
    /// A session with an unmeasured container.
    pub fn new(gallery: OverlayGallery, overlay_max_height: f64) -> Self {
        Self {
            container: None,
            overlay_max_height,
            base: None,
            pending_base: None,
            gallery,
            active: None,
            overlay_generation: 0,
            next_generation: 1,
            dragging: false,
        }
    }

    /// A session using the configured stage geometry, with the container
    /// already measured at the configured default size.
    pub fn from_config(config: &AppConfig, builtins: Vec<SourceRef>) -> Self {
        let gallery = OverlayGallery::with_builtins(builtins, config.gallery.max_items);
        let mut session = Self::new(gallery, config.stage.overlay_max_height);
        session.set_container_size(Dimensions::new(
            config.stage.container_width,
            config.stage.container_height,
        ));
        session
    }

    pub fn state(&self) -> SessionState {
        match (&self.base, &self.active) {
            (None, _) => SessionState::Empty,
            (Some(_), None) => SessionState::BaseLoaded,
            (Some(_), Some(_)) if self.dragging => SessionState::Dragging,
            (Some(_), Some(_)) => SessionState::OverlayActive,
        }
    }

    pub fn container(&self) -> Option<Dimensions> {
        self.container
    }

    pub fn overlay_max_height(&self) -> f64 {
        self.overlay_max_height
    }

    pub fn base(&self) -> Option<&BaseImage> {
        self.base.as_ref()
    }

    pub fn active(&self) -> Option<&ActiveOverlay> {
        self.active.as_ref()
    }

    pub fn gallery(&self) -> &OverlayGallery {
        &self.gallery
    }

    /// Whether a base upload is still decoding.
    pub fn is_base_loading(&self) -> bool {
        self.pending_base.is_some()
    }

    /// Record a new container measurement.
    ///
    /// A zero-size measurement marks the container unmeasured. The base
    /// display size is recomputed and the overlay is re-constrained.
    pub fn set_container_size(&mut self, size: Dimensions) {
        self.container = size.is_measured().then_some(size);
        if let Some(base) = self.base.as_mut() {
            let intrinsic = base.intrinsic_size;
            base.display_size = self.container.and_then(|c| fit_within(c, intrinsic));
        }
        if let (Some(active), Some(container)) = (self.active.as_mut(), self.container) {
            let offset = active.offset;
            active.move_to(offset, container);
        }
        tracing::debug!(container = ?self.container, "Container measured");
    }

    /// Start replacing the base image. The current base stays visible
    /// until the new one completes.
    pub fn begin_base_load(&mut self, source: SourceRef) -> DecodeTicket {
        let generation = self.bump_generation();
        tracing::debug!(generation, source = %source.source.describe(), "Base load started");
        self.pending_base = Some(PendingBase { generation, source });
        DecodeTicket {
            target: DecodeTarget::Base,
            generation,
        }
    }

    /// Finish a base load with its probed intrinsic size.
    ///
    /// Returns `false` (and changes nothing) if the ticket is stale.
    pub fn complete_base_load(&mut self, ticket: DecodeTicket, intrinsic: Dimensions) -> bool {
        let Some(pending) = self.take_pending_base(ticket) else {
            tracing::debug!(?ticket, "Ignoring stale base decode");
            return false;
        };
        let display_size = self.container.and_then(|c| fit_within(c, intrinsic));
        tracing::info!(
            intrinsic = %intrinsic,
            display = ?display_size,
            "Base image loaded"
        );
        self.base = Some(BaseImage {
            source: pending.source,
            intrinsic_size: intrinsic,
            display_size,
        });
        true
    }

    /// Abort a base load after a decode failure. Other state is untouched.
    pub fn fail_base_load(&mut self, ticket: DecodeTicket, error: &DecalError) -> bool {
        if self.take_pending_base(ticket).is_none() {
            return false;
        }
        tracing::warn!(error = %error, "Base image failed to load");
        true
    }

    /// Select a gallery sticker as the active overlay.
    ///
    /// The previous overlay's offset is discarded and the new overlay's
    /// display size is unknown until [`complete_overlay_probe`] runs.
    ///
    /// [`complete_overlay_probe`]: Session::complete_overlay_probe
    pub fn select_overlay(&mut self, id: u32) -> DecalResult<DecodeTicket> {
        if self.base.is_none() {
            return Err(DecalError::geometry_not_ready(
                "select a base image before choosing a sticker",
            ));
        }
        if self.gallery.get(id).is_none() {
            return Err(DecalError::UnknownOverlay { id });
        }
        let generation = self.bump_generation();
        self.overlay_generation = generation;
        self.active = Some(ActiveOverlay::selected(id));
        self.dragging = false;
        tracing::info!(id, "Overlay selected");
        Ok(DecodeTicket {
            target: DecodeTarget::Overlay { id },
            generation,
        })
    }

    /// Finish an overlay selection with the sticker's intrinsic size.
    ///
    /// Returns `false` if a newer selection superseded this ticket or the
    /// size is degenerate. A degenerate sticker is deactivated.
    pub fn complete_overlay_probe(&mut self, ticket: DecodeTicket, intrinsic: Dimensions) -> bool {
        if !self.is_current_overlay(ticket) {
            tracing::debug!(?ticket, "Ignoring stale overlay decode");
            return false;
        }
        let Some(size) = overlay_display_size(intrinsic, self.overlay_max_height) else {
            tracing::warn!(intrinsic = %intrinsic, "Overlay has degenerate dimensions; deactivated");
            self.active = None;
            self.dragging = false;
            return false;
        };
        if let Some(active) = self.active.as_mut() {
            active.display_size = Some(size);
            tracing::debug!(id = active.id, display = %size, "Overlay measured");
        }
        true
    }

    /// Drop a selection whose sticker failed to decode.
    pub fn fail_overlay_probe(&mut self, ticket: DecodeTicket, error: &DecalError) -> bool {
        if !self.is_current_overlay(ticket) {
            return false;
        }
        tracing::warn!(error = %error, "Overlay failed to load");
        self.active = None;
        self.dragging = false;
        true
    }

    /// Deactivate the current overlay, if any.
    pub fn remove_overlay(&mut self) -> Option<ActiveOverlay> {
        self.dragging = false;
        self.overlay_generation = self.bump_generation();
        self.active.take()
    }

    /// Add a sticker to the gallery.
    pub fn add_overlay(&mut self, source: SourceRef) -> DecalResult<u32> {
        self.gallery.add(source)
    }

    pub fn begin_drag(&mut self) -> DecalResult<()> {
        self.draggable()?;
        self.dragging = true;
        Ok(())
    }

    /// Move the overlay to `offset`, constrained to the container.
    /// Returns the offset actually applied.
    pub fn drag_to(&mut self, offset: Offset) -> DecalResult<Offset> {
        let container = self.draggable()?;
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| DecalError::geometry_not_ready("no overlay is active"))?;
        active.move_to(offset, container);
        Ok(active.offset)
    }

    /// Move the overlay by a relative delta.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> DecalResult<Offset> {
        let current = self.active.as_ref().map(|a| a.offset).unwrap_or_default();
        self.drag_to(Offset::new(current.x + dx, current.y + dy))
    }

    /// Release the drag. The last applied offset is kept as-is.
    pub fn end_drag(&mut self) -> Option<Offset> {
        self.dragging = false;
        self.active.as_ref().map(|a| a.offset)
    }

    fn draggable(&self) -> DecalResult<Dimensions> {
        let container = self
            .container
            .ok_or_else(|| DecalError::geometry_not_ready("container has not been measured"))?;
        match &self.active {
            Some(active) if active.is_ready() => Ok(container),
            Some(_) => Err(DecalError::geometry_not_ready(
                "overlay is still loading",
            )),
            None => Err(DecalError::geometry_not_ready("no overlay is active")),
        }
    }

    fn is_current_overlay(&self, ticket: DecodeTicket) -> bool {
        match (ticket.target, &self.active) {
            (DecodeTarget::Overlay { id }, Some(active)) => {
                active.id == id && ticket.generation == self.overlay_generation
            }
            _ => false,
        }
    }

    fn take_pending_base(&mut self, ticket: DecodeTicket) -> Option<PendingBase> {
        if ticket.target != DecodeTarget::Base {
            return None;
        }
        match &self.pending_base {
            Some(p) if p.generation == ticket.generation => self.pending_base.take(),
            _ => None,
        }
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }
}
