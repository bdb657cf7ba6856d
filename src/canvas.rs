use egui::{
    vec2, Color32, CursorIcon, FontId, PointerButton, Pos2, Rect, Sense, Stroke, StrokeKind,
    TextureHandle, Ui, Vec2,
};

use crate::annotation::{AnnotationId, AnnotationStore, DOT_BORDER, DOT_RADIUS, MARKER_SIZE};
use crate::geometry;
use crate::presentation::{PresentationMap, TooltipState};

const BUBBLE_FILL: Color32 = Color32::from_rgb(31, 41, 55);

enum EditAction {
    Commit(AnnotationId),
    Delete(AnnotationId),
}

/// The annotated image surface: draws the image texture and the marker
/// overlay, and turns pointer gestures into store operations.
///
/// All interaction goes through one canvas-wide response with a single
/// active drag target, so a drag gesture can never leak listeners or
/// double-fire; egui's click/drag disambiguation guarantees a drag never
/// also opens the click-to-edit overlay.
pub struct AnnotationCanvas {
    pub store: AnnotationStore,
    presentation: PresentationMap,
    drag: Option<AnnotationId>,
}

impl AnnotationCanvas {
    pub fn new() -> Self {
        Self {
            store: AnnotationStore::default(),
            presentation: PresentationMap::default(),
            drag: None,
        }
    }

    /// Discard all annotations and presentation state. Called when a new
    /// image is loaded or the user logs out.
    pub fn clear(&mut self) {
        self.store.clear();
        self.presentation = PresentationMap::default();
        self.drag = None;
    }

    /// Render the image scaled to fit (shrink-only) and handle all
    /// pointer interaction. Returns the displayed image rect; the export
    /// path needs its size to scale positions back to native resolution.
    pub fn show(&mut self, ui: &mut Ui, texture: &TextureHandle, image_size: Vec2) -> Rect {
        let avail = ui.available_size();
        let scale = (avail.x / image_size.x)
            .min(avail.y / image_size.y)
            .min(1.0)
            .max(0.0);
        let displayed = image_size * scale;

        let (response, painter) = ui.allocate_painter(displayed, Sense::click_and_drag());
        let image_rect = response.rect;

        painter.image(
            texture.id(),
            image_rect,
            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
        painter.rect_stroke(
            image_rect,
            0.0,
            Stroke::new(2.0, Color32::from_gray(160)),
            StrokeKind::Middle,
        );

        // Hover bookkeeping. The bounding rect is re-measured every frame,
        // so a resized window immediately re-bounds hover and drag.
        let hovered = response
            .hover_pos()
            .and_then(|pos| self.hit_test(pos, image_rect));
        let ids: Vec<AnnotationId> = self.store.iter().map(|a| a.id).collect();
        for id in ids {
            if hovered == Some(id) {
                self.presentation.pointer_enter(id);
            } else {
                self.presentation.pointer_leave(id);
            }
        }
        response.clone().on_hover_cursor(if hovered.is_some() {
            CursorIcon::PointingHand
        } else {
            CursorIcon::Crosshair
        });

        // Drag: at most one active target, set on pointer-down over a
        // marker and cleared exactly once when the gesture ends.
        if response.drag_started_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.drag = self.hit_test(pos, image_rect);
            }
        }
        if response.dragged_by(PointerButton::Primary) {
            if let Some(id) = self.drag {
                self.store
                    .move_by(id, response.drag_delta(), image_rect, MARKER_SIZE);
            }
        }
        if response.drag_stopped_by(PointerButton::Primary) {
            self.drag = None;
        }

        // Click: a marker click opens its editor and must not fall
        // through to the create branch, or a new annotation would appear
        // under the one being edited.
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                match self.hit_test(pos, image_rect) {
                    Some(id) => {
                        let text = self
                            .store
                            .get(id)
                            .map(|a| a.text.clone())
                            .unwrap_or_default();
                        self.presentation.begin_edit(id, &text);
                    }
                    None => {
                        // Placement is intentionally unclamped: the click
                        // lands exactly where the pointer is, edges included.
                        let p = geometry::to_image_relative(pos, image_rect);
                        self.store.create(p.x, p.y);
                    }
                }
            }
        }

        let mut actions: Vec<EditAction> = Vec::new();
        let annotations: Vec<(AnnotationId, Pos2, String)> = self
            .store
            .iter()
            .map(|a| (a.id, image_rect.min + vec2(a.x, a.y), a.text.clone()))
            .collect();

        for (id, origin, text) in &annotations {
            let center = *origin + vec2(DOT_RADIUS, DOT_RADIUS);
            painter.circle_filled(center, DOT_RADIUS + DOT_BORDER, Color32::WHITE);
            painter.circle_filled(center, DOT_RADIUS, Color32::BLACK);

            match self.presentation.state(*id).clone() {
                TooltipState::Idle => {}
                TooltipState::Hovered => {
                    let galley = painter.layout_no_wrap(
                        text.clone(),
                        FontId::proportional(13.0),
                        Color32::WHITE,
                    );
                    let bubble = Rect::from_min_size(
                        *origin + vec2(0.0, DOT_RADIUS * 2.0 + 4.0),
                        galley.size() + vec2(12.0, 8.0),
                    );
                    painter.rect_filled(bubble, 4.0, BUBBLE_FILL);
                    painter.galley(bubble.min + vec2(6.0, 4.0), galley, Color32::WHITE);
                }
                TooltipState::Editing { .. } => {
                    self.edit_overlay(ui.ctx(), *id, *origin, &mut actions);
                }
            }
        }

        for action in actions {
            match action {
                EditAction::Commit(id) => {
                    let draft = self.presentation.draft(id).map(str::to_owned);
                    if let Some(draft) = draft {
                        // A blank draft is rejected by the store and the
                        // edit session stays open.
                        if self.store.update_text(id, &draft) {
                            self.presentation.end_edit(id);
                        }
                    }
                }
                EditAction::Delete(id) => {
                    self.store.delete(id);
                    self.presentation.forget(id);
                    if self.drag == Some(id) {
                        self.drag = None;
                    }
                }
            }
        }

        image_rect
    }

    /// Topmost marker whose footprint contains the pointer; later
    /// annotations draw on top, so the last match wins.
    fn hit_test(&self, pointer: Pos2, image_rect: Rect) -> Option<AnnotationId> {
        let mut hit = None;
        for ann in self.store.iter() {
            let rect = Rect::from_min_size(
                image_rect.min + vec2(ann.x, ann.y),
                Vec2::splat(MARKER_SIZE),
            );
            if rect.contains(pointer) {
                hit = Some(ann.id);
            }
        }
        hit
    }

    fn edit_overlay(
        &mut self,
        ctx: &egui::Context,
        id: AnnotationId,
        origin: Pos2,
        actions: &mut Vec<EditAction>,
    ) {
        let area = egui::Area::new(egui::Id::new(("tooltip_edit", id)))
            .fixed_pos(origin + vec2(0.0, DOT_RADIUS * 2.0 + 4.0))
            .order(egui::Order::Foreground);
        area.show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(220.0);
                let Some(draft) = self.presentation.draft_mut(id) else {
                    return;
                };
                let te = ui.text_edit_singleline(draft);

                let mut save_clicked = false;
                let mut delete_clicked = false;
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save_clicked = true;
                    }
                    if ui.button("Delete").clicked() {
                        delete_clicked = true;
                    }
                });

                // Blur commits, but a blur caused by pressing one of our
                // own buttons is left to the button's click handler.
                let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
                let pointer_here = ui.ui_contains_pointer();
                let blur_commit = te.lost_focus() && (enter || !pointer_here);

                if delete_clicked {
                    actions.push(EditAction::Delete(id));
                } else if save_clicked || blur_commit {
                    actions.push(EditAction::Commit(id));
                } else if !te.has_focus() && !pointer_here {
                    te.request_focus();
                }
            });
        });
    }
}
