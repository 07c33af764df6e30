//! Resize session driven by a selection-cage handle.

use crate::app::App;
use crate::geometry::{transform_bounds, transform_crossed, BoundsHandle};
use crate::input::{KeyInfo, PointerInfo};
use crate::shapes::{ShapeId, ShapeModel};
use crate::state::StateBehavior;
use kurbo::{Point, Rect, Size, Vec2};
use log::warn;

#[derive(Debug)]
struct Snapshot {
    id: ShapeId,
    bounds: Rect,
    model: ShapeModel,
    /// Shape center relative to the combined box, in 0..1 coordinates.
    origin: Vec2,
    /// Whether this shape must keep its width:height ratio.
    aspect_locked: bool,
    can_resize: bool,
}

/// Active resize drag.
///
/// Each shape's new bounds are laid out proportionally inside the combined
/// box produced by the dragged handle. Alt doubles the delta and centers
/// the result on the original center. Shapes that cannot resize keep their
/// dimensions and follow their recorded relative origin; aspect-locked
/// shapes in a multi-selection scale by the smaller axis factor. Escape
/// restores every pre-session model.
#[derive(Debug)]
pub struct ResizingState {
    snapshots: Vec<Snapshot>,
    initial: Rect,
    handle: BoundsHandle,
}

impl Default for ResizingState {
    fn default() -> Self {
        Self {
            snapshots: Vec::new(),
            initial: Rect::ZERO,
            handle: BoundsHandle::BottomRight,
        }
    }
}

impl StateBehavior for ResizingState {
    fn on_enter(&mut self, app: &mut App) {
        app.history.pause();
        self.handle = app.active_handle.unwrap_or(BoundsHandle::BottomRight);
        self.initial = app.selection_bounds().unwrap_or(Rect::ZERO);
        let single = app.selected_ids.len() == 1;

        self.snapshots = app
            .selected_ids
            .iter()
            .filter_map(|id| {
                let instance = app.instances.get(id)?;
                let kind = app.registry.get(&instance.model.kind).ok()?;
                let model = instance.model.clone();
                let bounds = instance.bounds;
                let aspect_locked = model.is_aspect_ratio_locked
                    || !kind.can_change_aspect_ratio()
                    || kind.fixed_aspect_ratio(&model).is_some()
                    || (single && model.rotation != 0.0);
                Some(Snapshot {
                    id: id.clone(),
                    origin: Vec2::new(
                        (instance.center.x - self.initial.x0) / self.initial.width().max(1e-9),
                        (instance.center.y - self.initial.y0) / self.initial.height().max(1e-9),
                    ),
                    bounds,
                    aspect_locked,
                    can_resize: kind.can_resize(),
                    model,
                })
            })
            .collect();
    }

    fn on_exit(&mut self, _app: &mut App) {
        self.snapshots.clear();
    }

    fn on_pointer_move(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        if self.initial.width() <= 0.0 || self.initial.height() <= 0.0 {
            return None;
        }
        let mut delta = app.inputs.page_delta();
        if info.modifiers.alt {
            delta *= 2.0;
        }

        let single_locked = self.snapshots.len() == 1 && self.snapshots[0].aspect_locked;
        let aspect = (info.modifiers.shift || single_locked)
            .then(|| self.initial.width() / self.initial.height());

        let mut common = transform_bounds(self.initial, self.handle, delta, aspect);
        let (crossed_x, crossed_y) = transform_crossed(self.initial, self.handle, delta);
        if info.modifiers.alt {
            common = Rect::from_center_size(self.initial.center(), common.size());
        }

        let scale_x = (common.width() / self.initial.width()) * if crossed_x { -1.0 } else { 1.0 };
        let scale_y = (common.height() / self.initial.height()) * if crossed_y { -1.0 } else { 1.0 };

        for snap in &self.snapshots {
            let mut rx = (snap.bounds.x0 - self.initial.x0) / self.initial.width();
            let mut ry = (snap.bounds.y0 - self.initial.y0) / self.initial.height();
            let rw = snap.bounds.width() / self.initial.width();
            let rh = snap.bounds.height() / self.initial.height();
            if crossed_x {
                rx = 1.0 - rx - rw;
            }
            if crossed_y {
                ry = 1.0 - ry - rh;
            }

            let target = if !snap.can_resize {
                // Keep dimensions, follow the recorded relative origin
                let center = Point::new(
                    common.x0 + snap.origin.x * common.width(),
                    common.y0 + snap.origin.y * common.height(),
                );
                Rect::from_center_size(center, snap.bounds.size())
            } else if snap.aspect_locked && self.snapshots.len() > 1 {
                // Uniform scale by the smaller axis factor, placed by origin
                let s = scale_x.abs().min(scale_y.abs());
                let center = Point::new(
                    common.x0 + snap.origin.x * common.width(),
                    common.y0 + snap.origin.y * common.height(),
                );
                Rect::from_center_size(
                    center,
                    Size::new(snap.bounds.width() * s, snap.bounds.height() * s),
                )
            } else {
                Rect::new(
                    common.x0 + rx * common.width(),
                    common.y0 + ry * common.height(),
                    common.x0 + (rx + rw) * common.width(),
                    common.y0 + (ry + rh) * common.height(),
                )
            };

            let start = snap.bounds;
            if let Err(err) = app.mutate_shape(&snap.id, |model, kind| {
                kind.resize(model, start, target, Vec2::new(scale_x, scale_y));
            }) {
                warn!("resize failed: {err}");
            }
        }
        None
    }

    fn on_pointer_up(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        app.history.resume();
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            for snap in &self.snapshots {
                let restored = snap.model.clone();
                if let Err(err) = app.mutate_shape(&snap.id, move |model, _| *model = restored) {
                    warn!("resize revert failed: {err}");
                }
            }
            app.history.resume();
            return Some("idle");
        }
        None
    }
}
