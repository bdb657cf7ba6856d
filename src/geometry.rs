use egui::{Pos2, Rect, Vec2};

/// Convert a viewport-space pointer position into image-space coordinates
/// by subtracting the displayed image's origin.
///
/// Deliberately unclamped: initial placement may land anywhere inside the
/// click target, including exactly on an edge. Only subsequent moves are
/// bounded (see [`clamp_move`]).
pub fn to_image_relative(pointer: Pos2, image_rect: Rect) -> Pos2 {
    let rel = pointer - image_rect.left_top();
    Pos2::new(rel.x, rel.y)
}

/// Apply a drag delta to a marker position, clamped so the full
/// `marker_size` footprint stays inside `image_rect`.
///
/// `image_rect` must be the freshly measured display rect, not a cached
/// one: a window resize between drag events changes the valid range.
pub fn clamp_move(current: Pos2, delta: Vec2, image_rect: Rect, marker_size: f32) -> Pos2 {
    let max_x = image_rect.width() - marker_size;
    let max_y = image_rect.height() - marker_size;
    Pos2::new(
        (current.x + delta.x).max(0.0).min(max_x),
        (current.y + delta.y).max(0.0).min(max_y),
    )
}
