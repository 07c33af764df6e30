//! Resting state of the select tool: routes pointer-downs to phase states.

use crate::app::App;
use crate::geometry::BoundsHandle;
use crate::input::{EventTarget, KeyInfo, PinchInfo, PointerInfo};
use crate::state::StateBehavior;
use crate::tools::HIT_TOLERANCE;

#[derive(Debug, Default)]
pub struct IdleState;

impl StateBehavior for IdleState {
    fn on_enter(&mut self, app: &mut App) {
        app.active_handle = None;
        app.active_shape_handle = None;
    }

    fn on_pointer_down(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        // Platform modifier forces canvas pointing, ignoring shape hits
        if info.modifiers.platform() {
            return Some("pointing_canvas");
        }
        match &info.target {
            EventTarget::Canvas => Some("pointing_canvas"),
            EventTarget::Shape(id) => {
                if app.selected_ids.contains(id) {
                    Some("pointing_selected_shape")
                } else {
                    Some("pointing_shape")
                }
            }
            EventTarget::SelectionHandle(BoundsHandle::Rotate) => {
                app.active_handle = Some(BoundsHandle::Rotate);
                Some("pointing_rotate_handle")
            }
            EventTarget::SelectionHandle(handle) => {
                app.active_handle = Some(*handle);
                Some("pointing_resize_handle")
            }
            EventTarget::ShapeHandle(id, index) => {
                app.active_shape_handle = Some((id.clone(), *index));
                Some("pointing_handle")
            }
        }
    }

    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        let tolerance = HIT_TOLERANCE / app.camera.zoom;
        let hovered = app
            .shape_at_point(app.inputs.current_page, tolerance)
            .map(|inst| inst.id().clone());
        app.set_hovered(hovered);
        None
    }

    fn on_double_click(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        let EventTarget::Shape(id) = &info.target else {
            return None;
        };
        if app.selected_ids.len() != 1 || &app.selected_ids[0] != id {
            return None;
        }
        let editable = app
            .instances
            .get(id)
            .and_then(|inst| app.registry.get(&inst.model.kind).ok())
            .is_some_and(|kind| kind.can_edit());
        if editable {
            app.set_editing(Some(id.clone()));
            return Some("editing_shape");
        }
        None
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            app.deselect_all();
        }
        None
    }

    fn on_pinch(&mut self, _app: &mut App, _info: &PinchInfo) -> Option<&'static str> {
        Some("pinching")
    }
}
