use egui::{Rect, Vec2};

use crate::geometry;

pub type AnnotationId = u64;

/// On-screen footprint reserved for one marker, in display pixels. The
/// clamp bound and the marker hit-test both use this; they must agree or
/// dragging would bound the dot somewhere other than where it is drawn.
pub const MARKER_SIZE: f32 = 40.0;

/// Radius of the visible dot, drawn at the top-left of the footprint.
/// The export path rasterizes the same dot, so it lives here rather than
/// in the canvas.
pub const DOT_RADIUS: f32 = 8.0;

/// Width of the white ring around the dot.
pub const DOT_BORDER: f32 = 2.0;

/// Label text a freshly placed annotation starts with.
pub const DEFAULT_TEXT: &str = "Description";

/// A point-of-interest marker on the displayed image. `x`/`y` are offsets
/// from the image's top-left corner in display pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Owns the annotation collection for the current image.
///
/// Iteration order is insertion order. None of the operations fail:
/// unknown ids and blank edits degrade to no-ops so that callers never
/// have to handle an error from a pointer gesture.
#[derive(Default)]
pub struct AnnotationStore {
    items: Vec<Annotation>,
    next_id: AnnotationId,
}

impl AnnotationStore {
    /// Append a new annotation with a fresh id and the placeholder text.
    pub fn create(&mut self, x: f32, y: f32) -> AnnotationId {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Annotation {
            id,
            x,
            y,
            text: DEFAULT_TEXT.to_owned(),
        });
        id
    }

    /// Replace the label of `id`. Blank or whitespace-only text is
    /// rejected so an empty label can never persist; the return value
    /// tells the caller whether the edit was committed.
    pub fn update_text(&mut self, id: AnnotationId, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        match self.items.iter_mut().find(|a| a.id == id) {
            Some(ann) => {
                ann.text = text.to_owned();
                true
            }
            None => false,
        }
    }

    /// Apply a drag delta to `id`, clamped to keep the marker footprint
    /// inside `image_rect`. No-op for unknown ids.
    pub fn move_by(&mut self, id: AnnotationId, delta: Vec2, image_rect: Rect, marker_size: f32) {
        if let Some(ann) = self.items.iter_mut().find(|a| a.id == id) {
            let clamped =
                geometry::clamp_move(egui::pos2(ann.x, ann.y), delta, image_rect, marker_size);
            ann.x = clamped.x;
            ann.y = clamped.y;
        }
    }

    /// Remove `id` if present. Deleting an id twice is fine.
    pub fn delete(&mut self, id: AnnotationId) {
        self.items.retain(|a| a.id != id);
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every annotation. Used when a new image is loaded or the
    /// user logs out; the collection never outlives its image.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn display_rect(w: f32, h: f32) -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(w, h))
    }

    #[test]
    fn create_appends_with_unique_ids_and_default_text() {
        let mut store = AnnotationStore::default();
        let a = store.create(12.0, 34.0);
        let b = store.create(56.0, 78.0);
        assert_ne!(a, b);

        let items: Vec<_> = store.iter().collect();
        assert_eq!(items.len(), 2);
        assert_eq!((items[0].x, items[0].y), (12.0, 34.0));
        assert_eq!(items[0].text, DEFAULT_TEXT);
        assert_eq!((items[1].x, items[1].y), (56.0, 78.0));
    }

    #[test]
    fn delete_middle_preserves_order_and_ids() {
        let mut store = AnnotationStore::default();
        let a = store.create(10.0, 10.0);
        let b = store.create(50.0, 50.0);
        let c = store.create(90.0, 90.0);

        store.delete(b);

        let items: Vec<_> = store.iter().collect();
        assert_eq!(items.len(), 2);
        assert_eq!((items[0].id, items[0].x, items[0].y), (a, 10.0, 10.0));
        assert_eq!((items[1].id, items[1].x, items[1].y), (c, 90.0, 90.0));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = AnnotationStore::default();
        let id = store.create(1.0, 1.0);
        store.delete(id);
        store.delete(id);
        assert!(store.is_empty());
    }

    #[test]
    fn blank_text_edits_are_rejected() {
        let mut store = AnnotationStore::default();
        let id = store.create(0.0, 0.0);
        assert!(!store.update_text(id, ""));
        assert!(!store.update_text(id, "   "));
        assert_eq!(store.get(id).unwrap().text, DEFAULT_TEXT);

        assert!(store.update_text(id, "Door"));
        assert_eq!(store.get(id).unwrap().text, "Door");
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut store = AnnotationStore::default();
        let id = store.create(5.0, 5.0);
        let before = store.get(id).cloned().unwrap();

        assert!(!store.update_text(9999, "anything"));
        store.move_by(9999, vec2(10.0, 10.0), display_rect(100.0, 100.0), MARKER_SIZE);
        store.delete(9999);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).unwrap(), &before);
    }

    #[test]
    fn move_by_clamps_to_display_bounds() {
        let mut store = AnnotationStore::default();
        let rect = display_rect(640.0, 480.0);
        let id = store.create(595.0, 100.0);

        store.move_by(id, vec2(20.0, 0.0), rect, MARKER_SIZE);
        let ann = store.get(id).unwrap();
        assert_eq!((ann.x, ann.y), (600.0, 100.0));

        store.move_by(id, vec2(-1000.0, 1000.0), rect, MARKER_SIZE);
        let ann = store.get(id).unwrap();
        assert_eq!((ann.x, ann.y), (0.0, 440.0));
    }
}
