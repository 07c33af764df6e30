//! Brush selection: drag a rectangle over the canvas to select shapes.

use crate::app::App;
use crate::input::{KeyInfo, PointerInfo};
use crate::shapes::ShapeId;
use crate::spatial::SpatialIndex;
use crate::state::StateBehavior;
use kurbo::Rect;

/// Active brush-select session.
///
/// The document is bulk-loaded into a quadtree on enter so each move only
/// exact-tests shapes whose stored bounds touch the brush rectangle. Ctrl
/// requires full containment instead of intersection; shift toggles the
/// hits against the pre-drag selection.
#[derive(Debug, Default)]
pub struct BrushingState {
    initial_selection: Vec<ShapeId>,
    index: Option<SpatialIndex>,
}

impl StateBehavior for BrushingState {
    fn on_enter(&mut self, app: &mut App) {
        self.initial_selection = app.selected_ids.clone();
        self.index = Some(SpatialIndex::bulk_load(
            app.instances
                .values()
                .filter(|inst| !inst.model.is_hidden)
                .map(|inst| (inst.id().clone(), inst.rotated_bounds)),
        ));
    }

    fn on_exit(&mut self, app: &mut App) {
        app.brush = None;
        self.index = None;
        self.initial_selection.clear();
    }

    fn on_pointer_move(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        let rect = Rect::from_points(app.inputs.origin_page, app.inputs.current_page);
        app.brush = Some(rect);

        let candidates: std::collections::HashSet<ShapeId> = match &self.index {
            Some(index) => index.query(rect).into_iter().collect(),
            None => return None,
        };

        // Exact test per candidate, in document order
        let mut hits: Vec<ShapeId> = Vec::new();
        for model in &app.document.shapes {
            if !candidates.contains(&model.id) {
                continue;
            }
            let Ok(kind) = app.registry.get(&model.kind) else {
                continue;
            };
            let hit = if info.modifiers.ctrl {
                kind.contained_in_rect(model, rect)
            } else {
                kind.hit_test_rect(model, rect)
            };
            if hit {
                hits.push(model.id.clone());
            }
        }

        let selection = if info.modifiers.shift {
            let initial: std::collections::HashSet<&ShapeId> =
                self.initial_selection.iter().collect();
            if !hits.is_empty() && hits.iter().all(|id| initial.contains(id)) {
                // Everything under the brush was already selected: deselect it
                let hit_set: std::collections::HashSet<&ShapeId> = hits.iter().collect();
                self.initial_selection
                    .iter()
                    .filter(|id| !hit_set.contains(id))
                    .cloned()
                    .collect()
            } else {
                let mut merged = self.initial_selection.clone();
                for id in hits {
                    if !initial.contains(&id) {
                        merged.push(id);
                    }
                }
                merged
            }
        } else {
            hits
        };
        app.select_shapes(selection);
        None
    }

    fn on_pointer_up(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            app.select_shapes(self.initial_selection.clone());
            return Some("idle");
        }
        None
    }
}
