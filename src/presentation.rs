use std::collections::HashMap;

use crate::annotation::AnnotationId;

/// Transient display mode of a single annotation, separate from its
/// stored record. An annotation with no entry in the map is `Idle`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TooltipState {
    /// Marker dot only, label hidden.
    #[default]
    Idle,
    /// Label bubble shown, read-only.
    Hovered,
    /// Label shown as a text field with Save/Delete affordances.
    /// `draft` is the pending edit, not yet committed to the store.
    Editing { draft: String },
}

/// Per-annotation presentation state, keyed by id and owned by the
/// rendering layer. The store knows nothing about hover or edit mode.
#[derive(Default)]
pub struct PresentationMap {
    states: HashMap<AnnotationId, TooltipState>,
}

impl PresentationMap {
    pub fn state(&self, id: AnnotationId) -> &TooltipState {
        self.states.get(&id).unwrap_or(&TooltipState::Idle)
    }

    pub fn is_editing(&self, id: AnnotationId) -> bool {
        matches!(self.state(id), TooltipState::Editing { .. })
    }

    /// Whether the label bubble is visible at all (hovered or editing).
    pub fn label_visible(&self, id: AnnotationId) -> bool {
        !matches!(self.state(id), TooltipState::Idle)
    }

    /// Pointer entered the marker: `Idle` becomes `Hovered`. Editing is
    /// left alone.
    pub fn pointer_enter(&mut self, id: AnnotationId) {
        let state = self.states.entry(id).or_default();
        if *state == TooltipState::Idle {
            *state = TooltipState::Hovered;
        }
    }

    /// Pointer left the marker: only `Hovered` falls back to `Idle`; an
    /// open edit session keeps its label visible.
    pub fn pointer_leave(&mut self, id: AnnotationId) {
        if let Some(state) = self.states.get_mut(&id) {
            if *state == TooltipState::Hovered {
                *state = TooltipState::Idle;
            }
        }
    }

    /// Click on the marker: open an edit session seeded with the current
    /// label text. Re-clicking while already editing keeps the draft.
    pub fn begin_edit(&mut self, id: AnnotationId, current_text: &str) {
        let state = self.states.entry(id).or_default();
        if !matches!(state, TooltipState::Editing { .. }) {
            *state = TooltipState::Editing {
                draft: current_text.to_owned(),
            };
        }
    }

    /// Mutable access to the pending edit text, if `id` is editing.
    pub fn draft_mut(&mut self, id: AnnotationId) -> Option<&mut String> {
        match self.states.get_mut(&id) {
            Some(TooltipState::Editing { draft }) => Some(draft),
            _ => None,
        }
    }

    pub fn draft(&self, id: AnnotationId) -> Option<&str> {
        match self.state(id) {
            TooltipState::Editing { draft } => Some(draft),
            _ => None,
        }
    }

    /// Close the edit session after a successful commit. The caller only
    /// invokes this once the store accepted the new text; a blank draft
    /// never reaches this point, so the session stays open for it.
    pub fn end_edit(&mut self, id: AnnotationId) {
        if let Some(state) = self.states.get_mut(&id) {
            if matches!(state, TooltipState::Editing { .. }) {
                *state = TooltipState::Idle;
            }
        }
    }

    /// Drop any state for a deleted annotation.
    pub fn forget(&mut self, id: AnnotationId) {
        self.states.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationStore;

    #[test]
    fn hover_shows_and_hides_label() {
        let mut p = PresentationMap::default();
        assert!(!p.label_visible(1));

        p.pointer_enter(1);
        assert_eq!(p.state(1), &TooltipState::Hovered);

        p.pointer_leave(1);
        assert_eq!(p.state(1), &TooltipState::Idle);
    }

    #[test]
    fn pointer_leave_keeps_edit_session_open() {
        let mut p = PresentationMap::default();
        p.pointer_enter(1);
        p.begin_edit(1, "Description");
        p.pointer_leave(1);
        assert!(p.is_editing(1));
        assert!(p.label_visible(1));
    }

    #[test]
    fn begin_edit_seeds_draft_and_reclick_keeps_it() {
        let mut p = PresentationMap::default();
        p.begin_edit(1, "Description");
        p.draft_mut(1).unwrap().push_str(" of the door");
        p.begin_edit(1, "Description");
        assert_eq!(p.draft(1), Some("Description of the door"));
    }

    #[test]
    fn commit_flow_returns_to_idle_and_updates_store() {
        let mut store = AnnotationStore::default();
        let mut p = PresentationMap::default();
        let id = store.create(10.0, 10.0);

        // Type "Door", press Enter: the canvas commits the draft through
        // the store and closes the session only on acceptance.
        p.begin_edit(id, store.get(id).map(|a| a.text.as_str()).unwrap_or(""));
        *p.draft_mut(id).unwrap() = "Door".to_owned();

        let draft = p.draft(id).unwrap().to_owned();
        if store.update_text(id, &draft) {
            p.end_edit(id);
        }

        assert_eq!(store.get(id).unwrap().text, "Door");
        assert_eq!(p.state(id), &TooltipState::Idle);

        // Next hover shows the committed text read-only.
        p.pointer_enter(id);
        assert_eq!(p.state(id), &TooltipState::Hovered);
    }

    #[test]
    fn blank_commit_keeps_editing_and_store_text() {
        let mut store = AnnotationStore::default();
        let mut p = PresentationMap::default();
        let id = store.create(0.0, 0.0);

        p.begin_edit(id, "Description");
        *p.draft_mut(id).unwrap() = "   ".to_owned();

        let draft = p.draft(id).unwrap().to_owned();
        if store.update_text(id, &draft) {
            p.end_edit(id);
        }

        assert!(p.is_editing(id));
        assert_eq!(store.get(id).unwrap().text, "Description");
    }

    #[test]
    fn forget_clears_state_for_deleted_annotation() {
        let mut p = PresentationMap::default();
        p.begin_edit(7, "x");
        p.forget(7);
        assert_eq!(p.state(7), &TooltipState::Idle);
    }
}
