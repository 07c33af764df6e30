//! Rotate session around the selection center.

use crate::app::App;
use crate::geometry::{rotate_point, snap_angle};
use crate::input::{KeyInfo, PointerInfo};
use crate::shapes::{ShapeId, ShapeUpdate};
use crate::state::StateBehavior;
use kurbo::{Point, Size};
use std::f64::consts::PI;

const SNAP_INCREMENT: f64 = PI / 12.0;

#[derive(Debug)]
struct Snapshot {
    id: ShapeId,
    rotation: f64,
    center: Point,
    size: Size,
}

/// Active rotate drag.
///
/// Every shape spins by the same delta around the shared pivot: its own
/// rotation advances and its center orbits the pivot. Shift snaps the
/// delta to 15 degree increments. Escape restores the start transforms.
#[derive(Debug, Default)]
pub struct RotatingState {
    snapshots: Vec<Snapshot>,
    pivot: Point,
    start_angle: f64,
}

impl RotatingState {
    fn apply(&self, app: &mut App, delta: f64) {
        let updates: Vec<ShapeUpdate> = self
            .snapshots
            .iter()
            .map(|snap| {
                let center = rotate_point(snap.center, self.pivot, delta);
                let point = Point::new(
                    center.x - snap.size.width / 2.0,
                    center.y - snap.size.height / 2.0,
                );
                ShapeUpdate::new(snap.id.clone())
                    .point(point)
                    .rotation(snap.rotation + delta)
            })
            .collect();
        app.update_shapes(updates);
    }
}

impl StateBehavior for RotatingState {
    fn on_enter(&mut self, app: &mut App) {
        app.history.pause();
        self.pivot = app
            .selection_bounds()
            .map(|b| b.center())
            .unwrap_or(app.inputs.origin_page);
        let origin = app.inputs.origin_page;
        self.start_angle = (origin.y - self.pivot.y).atan2(origin.x - self.pivot.x);
        self.snapshots = app
            .selected_ids
            .iter()
            .filter_map(|id| {
                let instance = app.instances.get(id)?;
                Some(Snapshot {
                    id: id.clone(),
                    rotation: instance.model.rotation,
                    center: instance.center,
                    size: instance.bounds.size(),
                })
            })
            .collect();
    }

    fn on_exit(&mut self, _app: &mut App) {
        self.snapshots.clear();
    }

    fn on_pointer_move(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        let current = app.inputs.current_page;
        let angle = (current.y - self.pivot.y).atan2(current.x - self.pivot.x);
        let mut delta = angle - self.start_angle;
        if info.modifiers.shift {
            delta = snap_angle(delta, SNAP_INCREMENT);
        }
        self.apply(app, delta);
        None
    }

    fn on_pointer_up(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        app.history.resume();
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            self.apply(app, 0.0);
            app.history.resume();
            return Some("idle");
        }
        None
    }
}
