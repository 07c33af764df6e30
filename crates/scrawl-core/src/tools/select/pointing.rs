//! Pointer-down phases: a button is held but no session has started yet.
//!
//! Each state waits for the drag to exceed the dead zone before committing
//! to its active phase, so plain clicks never start a session.

use crate::app::App;
use crate::input::{EventTarget, PointerInfo};
use crate::state::StateBehavior;
use crate::tools::DEAD_ZONE;

fn pointed_shape(app: &App) -> Option<crate::shapes::ShapeId> {
    match app.inputs.pointer_down_target.as_ref() {
        Some(EventTarget::Shape(id)) => Some(id.clone()),
        _ => None,
    }
}

/// Pointer down on empty canvas; becomes a brush drag.
#[derive(Debug, Default)]
pub struct PointingCanvasState;

impl StateBehavior for PointingCanvasState {
    fn on_enter(&mut self, app: &mut App) {
        if !app.inputs.modifiers.shift {
            app.deselect_all();
        }
    }

    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        (app.inputs.drag_distance() > DEAD_ZONE).then_some("brushing")
    }

    fn on_pointer_up(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("idle")
    }
}

/// Pointer down on an unselected shape; becomes a translate drag.
#[derive(Debug, Default)]
pub struct PointingShapeState;

impl StateBehavior for PointingShapeState {
    fn on_enter(&mut self, app: &mut App) {
        let Some(id) = pointed_shape(app) else { return };
        if app.inputs.modifiers.shift {
            let mut ids = app.selected_ids.clone();
            ids.push(id);
            app.select_shapes(ids);
        } else {
            app.select_shapes(vec![id]);
        }
    }

    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        (app.inputs.drag_distance() > DEAD_ZONE).then_some("translating")
    }

    fn on_pointer_up(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("idle")
    }
}

/// Pointer down on an already-selected shape.
///
/// A drag translates the whole selection; a plain release narrows the
/// selection to the pointed shape, shift-release removes it instead.
#[derive(Debug, Default)]
pub struct PointingSelectedShapeState;

impl StateBehavior for PointingSelectedShapeState {
    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        (app.inputs.drag_distance() > DEAD_ZONE).then_some("translating")
    }

    fn on_pointer_up(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        if let Some(id) = pointed_shape(app) {
            if info.modifiers.shift {
                let ids = app
                    .selected_ids
                    .iter()
                    .filter(|s| **s != id)
                    .cloned()
                    .collect();
                app.select_shapes(ids);
            } else {
                app.select_shapes(vec![id]);
            }
        }
        Some("idle")
    }
}

/// Pointer down on a resize handle of the selection cage.
#[derive(Debug, Default)]
pub struct PointingResizeHandleState;

impl StateBehavior for PointingResizeHandleState {
    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        (app.inputs.drag_distance() > DEAD_ZONE).then_some("resizing")
    }

    fn on_pointer_up(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("idle")
    }
}

/// Pointer down on the rotate handle of the selection cage.
#[derive(Debug, Default)]
pub struct PointingRotateHandleState;

impl StateBehavior for PointingRotateHandleState {
    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        (app.inputs.drag_distance() > DEAD_ZONE).then_some("rotating")
    }

    fn on_pointer_up(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("idle")
    }
}

/// Pointer down on a shape's own editable handle.
#[derive(Debug, Default)]
pub struct PointingHandleState;

impl StateBehavior for PointingHandleState {
    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        (app.inputs.drag_distance() > DEAD_ZONE).then_some("translating_handle")
    }

    fn on_pointer_up(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("idle")
    }
}
