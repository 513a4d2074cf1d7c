//! Append-only sticker gallery.

use decal_common::error::{DecalError, DecalResult};

use crate::source::SourceRef;

/// One selectable sticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayCandidate {
    /// Stable id, `1`-based and never reused.
    pub id: u32,
    pub source: SourceRef,
}

/// The list of stickers a user can pick from.
///
/// Entries are only ever appended; ids are `len + 1` at insertion time.
#[derive(Debug, Clone, Default)]
pub struct OverlayGallery {
    items: Vec<OverlayCandidate>,
    capacity: Option<usize>,
}

impl OverlayGallery {
    /// An empty gallery with an optional size limit.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// A gallery seeded with built-in stickers. Built-ins count toward
    /// the capacity but are never rejected by it.
    pub fn with_builtins(builtins: Vec<SourceRef>, capacity: Option<usize>) -> Self {
        let mut gallery = Self::new(capacity);
        for source in builtins {
            gallery.push(source);
        }
        gallery
    }

    /// Append a sticker and return its id.
    pub fn add(&mut self, source: SourceRef) -> DecalResult<u32> {
        if let Some(capacity) = self.capacity {
            if self.items.len() >= capacity {
                return Err(DecalError::GalleryFull { capacity });
            }
        }
        let described = source.source.describe();
        let id = self.push(source);
        tracing::debug!(id, source = %described, "Sticker added to gallery");
        Ok(id)
    }

    /// Whether another sticker can be added.
    pub fn can_add(&self) -> bool {
        self.capacity.map_or(true, |cap| self.items.len() < cap)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn list(&self) -> &[OverlayCandidate] {
        &self.items
    }

    pub fn get(&self, id: u32) -> Option<&OverlayCandidate> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, source: SourceRef) -> u32 {
        let id = self.items.len() as u32 + 1;
        self.items.push(OverlayCandidate { id, source });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ImageSource;

    fn sticker(tag: u8) -> SourceRef {
        SourceRef::local(ImageSource::from(vec![tag]))
    }

    #[test]
    fn ids_are_sequential_and_stable() {
        let mut gallery = OverlayGallery::with_builtins(vec![sticker(1), sticker(2)], None);
        assert_eq!(gallery.add(sticker(3)).unwrap(), 3);
        assert_eq!(gallery.add(sticker(4)).unwrap(), 4);

        let ids: Vec<u32> = gallery.list().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(gallery.get(3).unwrap().source, sticker(3));
        assert!(gallery.get(9).is_none());
    }

    #[test]
    fn capacity_stops_additions() {
        let mut gallery = OverlayGallery::with_builtins(vec![sticker(1)], Some(2));
        assert!(gallery.can_add());
        gallery.add(sticker(2)).unwrap();
        assert!(!gallery.can_add());
        let err = gallery.add(sticker(3)).unwrap_err();
        assert!(matches!(err, DecalError::GalleryFull { capacity: 2 }));
        assert_eq!(gallery.len(), 2);
    }

    #[test]
    fn builtins_ignore_capacity() {
        let gallery = OverlayGallery::with_builtins(vec![sticker(1), sticker(2), sticker(3)], Some(2));
        assert_eq!(gallery.len(), 3);
        assert!(!gallery.can_add());
    }
}
