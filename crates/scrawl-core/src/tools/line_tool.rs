//! Two-handle line creation tool.

use crate::app::App;
use crate::geometry::snap_angle;
use crate::input::{KeyInfo, PointerInfo};
use crate::shapes::{ShapeId, ShapeModel, ShapeProps};
use crate::state::{Passive, StateBehavior, StateNode};
use crate::tools::DEAD_ZONE;
use kurbo::Vec2;
use log::warn;
use std::f64::consts::PI;

const SNAP_INCREMENT: f64 = PI / 12.0;

pub fn line_tool() -> StateNode {
    StateNode::new("line", Box::new(Passive))
        .with_initial("idle")
        .with_children(vec![
            StateNode::new("idle", Box::new(IdleState)),
            StateNode::new("pointing", Box::new(PointingState)),
            StateNode::new("creating", Box::new(CreatingState { shape: None })),
        ])
}

#[derive(Debug)]
struct IdleState;

impl StateBehavior for IdleState {
    fn on_pointer_down(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("pointing")
    }
}

#[derive(Debug)]
struct PointingState;

impl StateBehavior for PointingState {
    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        (app.inputs.drag_distance() > DEAD_ZONE).then_some("creating")
    }

    fn on_pointer_up(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("idle")
    }

    fn on_key_down(&mut self, _app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        (info.key == "Escape").then_some("idle")
    }
}

/// Active line drag: the second handle tracks the pointer.
///
/// Shift snaps the segment angle to 15 degree increments.
#[derive(Debug)]
struct CreatingState {
    shape: Option<ShapeId>,
}

impl StateBehavior for CreatingState {
    fn on_enter(&mut self, app: &mut App) {
        app.history.pause();
        let origin = app.inputs.origin_page;
        let model = ShapeModel::new(
            "line",
            origin,
            ShapeProps::Line {
                handles: vec![[0.0, 0.0], [0.0, 0.0]],
            },
        );
        let id = model.id.clone();
        match app.add_shapes(vec![model], None) {
            Ok(()) => {
                app.select_shapes(vec![id.clone()]);
                self.shape = Some(id);
            }
            Err(err) => {
                warn!("line creation failed: {err}");
                self.shape = None;
            }
        }
    }

    fn on_exit(&mut self, _app: &mut App) {
        self.shape = None;
    }

    fn on_pointer_move(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        let Some(id) = self.shape.clone() else {
            return None;
        };
        let origin = app.inputs.origin_page;
        let mut end = app.inputs.current_page;
        if info.modifiers.shift {
            let v = end - origin;
            let snapped = snap_angle(v.y.atan2(v.x), SNAP_INCREMENT);
            end = origin + Vec2::new(snapped.cos(), snapped.sin()) * v.hypot();
        }
        // The origin handle stays put; handle 1 follows the pointer
        if let Err(err) = app.mutate_shape(&id, |model, kind| {
            kind.on_handle_change(model, 1, end);
        }) {
            warn!("line drag failed: {err}");
        }
        None
    }

    fn on_pointer_up(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        app.history.resume();
        if !app.is_tool_locked {
            app.request_tool("select");
        }
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            if let Some(id) = self.shape.take() {
                app.delete_shapes(&[id]);
            }
            app.history.resume();
            return Some("idle");
        }
        None
    }
}
