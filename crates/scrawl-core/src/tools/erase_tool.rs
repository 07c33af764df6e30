//! Erase tool: mark shapes along the pointer path, delete on release.

use crate::app::App;
use crate::input::{KeyInfo, PointerInfo};
use crate::shapes::{ShapeId, ShapeUpdate};
use crate::state::{Passive, StateBehavior, StateNode};
use crate::tools::{DEAD_ZONE, HIT_TOLERANCE};
use kurbo::Rect;

pub fn erase_tool() -> StateNode {
    StateNode::new("erase", Box::new(Passive))
        .with_initial("idle")
        .with_children(vec![
            StateNode::new("idle", Box::new(IdleState)),
            StateNode::new("pointing", Box::new(PointingState)),
            StateNode::new("erasing", Box::new(ErasingState)),
        ])
}

/// Flag shapes as ghosts and remember them for deletion.
fn mark(app: &mut App, ids: Vec<ShapeId>) {
    let updates: Vec<ShapeUpdate> = ids
        .iter()
        .filter(|id| !app.erasing_ids.contains(id))
        .map(|id| {
            let mut update = ShapeUpdate::new(id.clone());
            update.is_ghost = Some(true);
            update
        })
        .collect();
    if updates.is_empty() {
        return;
    }
    app.update_shapes(updates);
    for id in ids {
        if !app.erasing_ids.contains(&id) {
            app.erasing_ids.push(id);
        }
    }
}

/// Unghost everything marked this session without deleting.
fn clear_marks(app: &mut App) {
    let updates: Vec<ShapeUpdate> = app
        .erasing_ids
        .iter()
        .map(|id| {
            let mut update = ShapeUpdate::new(id.clone());
            update.is_ghost = Some(false);
            update
        })
        .collect();
    app.update_shapes(updates);
    app.erasing_ids.clear();
}

/// Delete everything marked this session.
fn commit(app: &mut App) {
    let ids = std::mem::take(&mut app.erasing_ids);
    if !ids.is_empty() {
        app.delete_shapes(&ids);
    }
}

#[derive(Debug)]
struct IdleState;

impl StateBehavior for IdleState {
    fn on_pointer_down(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("pointing")
    }
}

/// Button held but not yet dragging: shapes under the initial point are
/// pre-marked, nothing is deleted until release.
#[derive(Debug)]
struct PointingState;

impl StateBehavior for PointingState {
    fn on_enter(&mut self, app: &mut App) {
        app.history.pause();
        let point = app.inputs.origin_page;
        let tolerance = HIT_TOLERANCE / app.camera.zoom;
        // Rect hit, not point hit: the eraser takes unfilled interiors too
        let spot = Rect::from_points(point, point).inflate(tolerance, tolerance);
        let hits: Vec<ShapeId> = app
            .document
            .shapes
            .iter()
            .filter(|m| !m.is_hidden && !m.is_locked)
            .filter(|m| {
                app.registry
                    .get(&m.kind)
                    .is_ok_and(|kind| kind.hit_test_rect(m, spot))
            })
            .map(|m| m.id.clone())
            .collect();
        mark(app, hits);
    }

    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        (app.inputs.drag_distance() > DEAD_ZONE).then_some("erasing")
    }

    fn on_pointer_up(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        commit(app);
        app.history.resume();
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            clear_marks(app);
            app.history.resume();
            return Some("idle");
        }
        None
    }
}

/// Active erase drag: each movement segment is tested against the shapes
/// currently in the viewport.
#[derive(Debug)]
struct ErasingState;

impl StateBehavior for ErasingState {
    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        let tolerance = HIT_TOLERANCE / app.camera.zoom;
        let segment = Rect::from_points(app.inputs.previous_page, app.inputs.current_page)
            .inflate(tolerance, tolerance);
        let hits: Vec<ShapeId> = app
            .shapes_in_viewport()
            .iter()
            .filter(|inst| !inst.model.is_hidden && !inst.model.is_locked)
            .filter(|inst| !app.erasing_ids.contains(inst.id()))
            .filter(|inst| {
                app.registry
                    .get(&inst.model.kind)
                    .is_ok_and(|kind| kind.hit_test_rect(&inst.model, segment))
            })
            .map(|inst| inst.id().clone())
            .collect();
        mark(app, hits);
        None
    }

    fn on_pointer_up(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        commit(app);
        app.history.resume();
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            clear_marks(app);
            app.history.resume();
            return Some("idle");
        }
        None
    }
}
