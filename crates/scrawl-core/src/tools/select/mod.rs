//! The select tool: pointing, brushing, and transform sessions.

mod brushing;
mod idle;
mod pointing;
mod resizing;
mod rotating;
mod translating;

pub use brushing::BrushingState;
pub use idle::IdleState;
pub use pointing::{
    PointingCanvasState, PointingHandleState, PointingResizeHandleState,
    PointingRotateHandleState, PointingSelectedShapeState, PointingShapeState,
};
pub use resizing::ResizingState;
pub use rotating::RotatingState;
pub use translating::{TranslatingHandleState, TranslatingState};

use crate::app::App;
use crate::input::{EventTarget, KeyInfo, PinchInfo, PointerInfo};
use crate::state::{Passive, StateBehavior, StateNode};

/// Assemble the select tool node.
pub fn select_tool() -> StateNode {
    StateNode::new("select", Box::new(Passive))
        .with_initial("idle")
        .with_children(vec![
            StateNode::new("idle", Box::<IdleState>::default()),
            StateNode::new("pointing_canvas", Box::<PointingCanvasState>::default()),
            StateNode::new("pointing_shape", Box::<PointingShapeState>::default()),
            StateNode::new(
                "pointing_selected_shape",
                Box::<PointingSelectedShapeState>::default(),
            ),
            StateNode::new(
                "pointing_resize_handle",
                Box::<PointingResizeHandleState>::default(),
            ),
            StateNode::new(
                "pointing_rotate_handle",
                Box::<PointingRotateHandleState>::default(),
            ),
            StateNode::new("pointing_handle", Box::<PointingHandleState>::default()),
            StateNode::new("translating", Box::<TranslatingState>::default()),
            StateNode::new("translating_handle", Box::<TranslatingHandleState>::default()),
            StateNode::new("resizing", Box::<ResizingState>::default()),
            StateNode::new("rotating", Box::<RotatingState>::default()),
            StateNode::new("brushing", Box::<BrushingState>::default()),
            StateNode::new("editing_shape", Box::<EditingShapeState>::default()),
            StateNode::new("pinching", Box::<PinchingState>::default()),
        ])
}

/// Active while a shape's content is being edited in place.
///
/// The host feeds text changes through `update_shapes`; this state only
/// decides when the editing session ends.
#[derive(Debug, Default)]
pub struct EditingShapeState;

impl StateBehavior for EditingShapeState {
    fn on_pointer_down(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        if let EventTarget::Shape(id) = &info.target {
            if app.editing_id.as_ref() == Some(id) {
                return None;
            }
        }
        app.set_editing(None);
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            app.set_editing(None);
            return Some("idle");
        }
        None
    }
}

/// Two-finger zoom session.
#[derive(Debug, Default)]
pub struct PinchingState;

impl StateBehavior for PinchingState {
    fn on_pinch(&mut self, app: &mut App, info: &PinchInfo) -> Option<&'static str> {
        app.camera.zoom_at(info.center, info.scale);
        app.camera.pan(-info.delta);
        None
    }

    fn on_pointer_up(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("idle")
    }
}
