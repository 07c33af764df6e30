//! Text tool: click to place a text shape and edit it in place.

use crate::app::App;
use crate::input::{EventTarget, KeyInfo, PointerInfo};
use crate::shapes::{ShapeId, ShapeModel, ShapeProps};
use crate::state::{Passive, StateBehavior, StateNode};
use log::warn;

/// Starting block size before the host measures real text.
const SEED_SIZE: [f64; 2] = [16.0, 24.0];

pub fn text_tool() -> StateNode {
    StateNode::new("text", Box::new(Passive))
        .with_initial("idle")
        .with_children(vec![
            StateNode::new("idle", Box::new(IdleState)),
            StateNode::new("editing", Box::new(EditingState { shape: None })),
        ])
}

#[derive(Debug)]
struct IdleState;

impl StateBehavior for IdleState {
    fn on_pointer_down(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        let point = app.inputs.origin_page;
        let model = ShapeModel::new(
            "text",
            point,
            ShapeProps::Text {
                text: String::new(),
                size: SEED_SIZE,
            },
        );
        let id = model.id.clone();
        match app.add_shapes(vec![model], None) {
            Ok(()) => {
                app.select_shapes(vec![id.clone()]);
                app.set_editing(Some(id));
                Some("editing")
            }
            Err(err) => {
                warn!("text creation failed: {err}");
                None
            }
        }
    }
}

/// In-place editing session for the freshly placed text shape.
///
/// The host feeds content through `update_shapes`; this state ends the
/// session and drops the shape again if no text was entered.
#[derive(Debug)]
struct EditingState {
    shape: Option<ShapeId>,
}

impl EditingState {
    fn finish(&mut self, app: &mut App) {
        app.set_editing(None);
        if let Some(id) = self.shape.take() {
            let empty = matches!(
                app.document.shape(&id).map(|m| &m.props),
                Some(ShapeProps::Text { text, .. }) if text.is_empty()
            );
            if empty {
                app.delete_shapes(&[id]);
            }
        }
        if !app.is_tool_locked {
            app.request_tool("select");
        }
    }
}

impl StateBehavior for EditingState {
    fn on_enter(&mut self, app: &mut App) {
        self.shape = app.editing_id.clone();
    }

    fn on_pointer_down(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        if let EventTarget::Shape(id) = &info.target {
            if app.editing_id.as_ref() == Some(id) {
                return None;
            }
        }
        self.finish(app);
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            self.finish(app);
            return Some("idle");
        }
        None
    }
}
