//! Top-level tools, each a small state machine over interaction phases.

mod box_tool;
mod draw_tool;
mod erase_tool;
mod line_tool;
pub mod select;
mod text_tool;

pub use box_tool::{bounds_tool, box_tool, dot_tool};
pub use draw_tool::draw_tool;
pub use erase_tool::erase_tool;
pub use line_tool::line_tool;
pub use select::select_tool;
pub use text_tool::text_tool;

use crate::app::App;
use crate::input::KeyInfo;
use crate::state::{StateBehavior, StateNode};

/// Page-space distance a pointer must travel before a `pointing` phase
/// commits to its active phase. Debounces clicks against drags.
pub const DEAD_ZONE: f64 = 5.0;

/// Page-space slop around pointer hit tests, divided by zoom by callers
/// that want screen-constant behavior.
pub const HIT_TOLERANCE: f64 = 4.0;

/// The full tool tree with `select` active.
pub fn root_node() -> StateNode {
    StateNode::new("root", Box::new(RootBehavior))
        .with_initial("select")
        .with_children(vec![
            select_tool(),
            box_tool(),
            dot_tool(),
            draw_tool(),
            line_tool(),
            erase_tool(),
            text_tool(),
        ])
}

/// Global keyboard shortcuts, active whenever no shape is being edited.
#[derive(Debug, Default)]
struct RootBehavior;

impl StateBehavior for RootBehavior {
    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if app.editing_id.is_some() {
            return None;
        }
        match info.key.as_str() {
            "Delete" | "Backspace" => {
                let ids = app.selected_ids.clone();
                if !ids.is_empty() {
                    app.delete_shapes(&ids);
                }
            }
            "z" if info.modifiers.platform() && info.modifiers.shift => app.redo(),
            "z" if info.modifiers.platform() => app.undo(),
            "y" if info.modifiers.platform() => app.redo(),
            "a" if info.modifiers.platform() => app.select_all(),
            _ => {}
        }
        None
    }
}
