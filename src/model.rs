//! Composition tree: Composition → Container → Slot → ImageAttachment.
//!
//! Every node is plain owned data so a state snapshot can be cloned cheaply.
//! Decoded pixels sit behind a reference-counted [`PixelHandle`], which lets
//! history snapshots share buffers structurally.

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

use crate::layout::LayoutTemplate;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh random id.
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, uuid::Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_id!(
    /// Identifier of a [`Composition`].
    CompositionId,
    "comp"
);
define_id!(
    /// Identifier of a [`Container`].
    ContainerId,
    "container"
);
define_id!(
    /// Identifier of a [`Slot`].
    SlotId,
    "slot"
);
define_id!(
    /// Identifier of an [`ImageAttachment`].
    AttachmentId,
    "img"
);

/// Shared handle to decoded RGBA pixels.
///
/// Equality is identity: two handles are equal only if they point at the same
/// buffer.
#[derive(Clone)]
pub struct PixelHandle {
    pixels: Arc<RgbaImage>,
}

impl PixelHandle {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Number of live handles to the underlying buffer.
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.pixels)
    }
}

impl PartialEq for PixelHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl fmt::Debug for PixelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelHandle")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

/// A decoded image placed in a slot.
///
/// Natural dimensions are captured once at decode time.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    id: AttachmentId,
    pixels: PixelHandle,
    file_name: String,
    width: u32,
    height: u32,
}

impl ImageAttachment {
    pub fn new(pixels: RgbaImage, file_name: &str) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            id: AttachmentId::generate(),
            pixels: PixelHandle::new(pixels),
            file_name: file_name.to_string(),
            width,
            height,
        }
    }

    pub fn id(&self) -> &AttachmentId {
        &self.id
    }

    pub fn pixels(&self) -> &PixelHandle {
        &self.pixels
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Natural aspect ratio (width / height).
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub id: SlotId,
    /// Position within the container; maps to the template's slot spec.
    pub index: usize,
    image: Option<ImageAttachment>,
}

impl Slot {
    pub fn empty(index: usize) -> Self {
        Self {
            id: SlotId::generate(),
            index,
            image: None,
        }
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }

    /// Stores `attachment`, returning the one it replaced.
    pub(crate) fn replace_image(&mut self, attachment: ImageAttachment) -> Option<ImageAttachment> {
        self.image.replace(attachment)
    }

    pub(crate) fn take_image(&mut self) -> Option<ImageAttachment> {
        self.image.take()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: ContainerId,
    pub slots: Vec<Slot>,
}

impl Container {
    pub fn with_slots(count: usize) -> Self {
        Self {
            id: ContainerId::generate(),
            slots: (0..count).map(Slot::empty).collect(),
        }
    }

    pub(crate) fn push_empty_slot(&mut self) -> &Slot {
        let index = self.slots.len();
        self.slots.push(Slot::empty(index));
        &self.slots[index]
    }
}

/// A template instance: an owned template snapshot plus its containers.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub id: CompositionId,
    pub template: LayoutTemplate,
    pub containers: Vec<Container>,
}

impl Composition {
    /// Instantiates `template` with one container of empty slots.
    pub fn new(template: &LayoutTemplate) -> Self {
        Self {
            id: CompositionId::generate(),
            template: template.clone(),
            containers: vec![Container::with_slots(template.initial_slot_count())],
        }
    }

    pub fn primary_container(&self) -> Option<&Container> {
        self.containers.first()
    }

    pub fn slot_count(&self) -> usize {
        self.primary_container().map_or(0, |c| c.slots.len())
    }

    /// True only for linear templates below their maximum slot count.
    pub fn can_grow(&self) -> bool {
        if !self.template.is_linear() {
            return false;
        }
        match self.template.max_slot_count() {
            None => true,
            Some(max) => self.slot_count() < max,
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.containers.iter().flat_map(|c| c.slots.iter())
    }

    pub fn find_slot(&self, id: &SlotId) -> Option<&Slot> {
        self.slots().find(|s| &s.id == id)
    }

    pub(crate) fn find_slot_mut(&mut self, id: &SlotId) -> Option<&mut Slot> {
        self.containers
            .iter_mut()
            .flat_map(|c| c.slots.iter_mut())
            .find(|s| &s.id == id)
    }

    /// Attached images in container then slot order.
    pub fn attachments(&self) -> impl Iterator<Item = &ImageAttachment> {
        self.slots().filter_map(|s| s.image())
    }

    pub fn has_images(&self) -> bool {
        self.attachments().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutCatalog;

    fn template(id: &str) -> LayoutTemplate {
        LayoutCatalog::builtin()
            .lookup(id)
            .cloned()
            .expect("builtin template")
    }

    fn attachment(w: u32, h: u32) -> ImageAttachment {
        ImageAttachment::new(RgbaImage::new(w, h), "shot.png")
    }

    #[test]
    fn test_ids_are_unique_and_prefixed() {
        let a = SlotId::generate();
        let b = SlotId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("slot-"));
        assert!(CompositionId::generate().to_string().starts_with("comp-"));
    }

    #[test]
    fn test_new_composition_slot_counts() {
        assert_eq!(Composition::new(&template("horizontal-stack")).slot_count(), 2);
        assert_eq!(Composition::new(&template("grid-3x3")).slot_count(), 9);
        assert_eq!(Composition::new(&template("phone")).slot_count(), 1);
    }

    #[test]
    fn test_slot_indices_follow_position() {
        let comp = Composition::new(&template("top-focus-5"));
        for (i, slot) in comp.slots().enumerate() {
            assert_eq!(slot.index, i);
            assert!(slot.is_empty());
        }
    }

    #[test]
    fn test_can_grow_only_linear() {
        assert!(Composition::new(&template("vertical-stack")).can_grow());
        assert!(!Composition::new(&template("grid-2x2")).can_grow());
        assert!(!Composition::new(&template("browser")).can_grow());
    }

    #[test]
    fn test_attachment_dimensions_captured() {
        let att = attachment(1000, 500);
        assert_eq!((att.width(), att.height()), (1000, 500));
        assert!((att.aspect() - 2.0).abs() < f64::EPSILON);
        assert_eq!(att.file_name(), "shot.png");
    }

    #[test]
    fn test_pixel_handle_identity_equality() {
        let a = PixelHandle::new(RgbaImage::new(2, 2));
        let b = PixelHandle::new(RgbaImage::new(2, 2));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.share_count(), 1);
        let c = a.clone();
        assert_eq!(c.share_count(), 2);
    }

    #[test]
    fn test_replace_image_returns_prior() {
        let mut comp = Composition::new(&template("before-after"));
        let slot_id = comp.containers[0].slots[0].id.clone();
        let first = attachment(10, 10);
        let first_id = first.id().clone();

        let slot = comp.find_slot_mut(&slot_id).expect("slot");
        assert!(slot.replace_image(first).is_none());
        let prior = slot.replace_image(attachment(20, 20)).expect("prior");
        assert_eq!(prior.id(), &first_id);
        assert!(comp.has_images());
        assert_eq!(comp.attachments().count(), 1);
    }

    #[test]
    fn test_attachments_in_slot_order() {
        let mut comp = Composition::new(&template("horizontal-stack"));
        comp.containers[0].push_empty_slot();
        comp.containers[0].slots[2].replace_image(attachment(3, 3));
        comp.containers[0].slots[0].replace_image(attachment(1, 1));
        let widths: Vec<u32> = comp.attachments().map(|a| a.width()).collect();
        assert_eq!(widths, vec![1, 3]);
    }

    #[test]
    fn test_pixel_handle_debug_shows_dimensions() {
        let handle = PixelHandle::new(RgbaImage::new(7, 3));
        let debug = format!("{:?}", handle);
        assert!(debug.contains("width: 7"));
        assert!(debug.contains("height: 3"));
    }
}
