//! Bounds-dragged creation tools: box, dot, and any host-registered kind
//! whose creation gesture is "drag out a rectangle".

use crate::app::App;
use crate::geometry::{transform_bounds, transform_crossed, BoundsHandle};
use crate::input::{KeyInfo, PointerInfo};
use crate::shapes::{ShapeId, ShapeModel, ShapeProps};
use crate::state::{Passive, StateBehavior, StateNode};
use crate::tools::DEAD_ZONE;
use kurbo::{Point, Rect, Vec2};
use log::warn;

/// Builds the minimal seed model placed at the drag origin.
pub type SeedFn = fn(Point) -> ShapeModel;

/// Assemble a creation tool for any kind seeded from a point and grown by
/// dragging its bottom-right corner.
pub fn bounds_tool(id: &'static str, seed: SeedFn) -> StateNode {
    StateNode::new(id, Box::new(Passive))
        .with_initial("idle")
        .with_children(vec![
            StateNode::new("idle", Box::new(IdleState)),
            StateNode::new("pointing", Box::new(PointingState)),
            StateNode::new(
                "creating",
                Box::new(CreatingState {
                    seed,
                    shape: None,
                    initial: Rect::ZERO,
                }),
            ),
        ])
}

/// The box creation tool.
pub fn box_tool() -> StateNode {
    bounds_tool("box", |point| {
        ShapeModel::new("box", point, ShapeProps::Box { size: [1.0, 1.0] })
    })
}

/// The dot creation tool.
pub fn dot_tool() -> StateNode {
    bounds_tool("dot", |point| {
        ShapeModel::new("dot", point, ShapeProps::Dot { radius: 0.5 })
    })
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

/// Active creation drag.
///
/// The seed shape is added immediately; the drag resizes it with the same
/// corner math the select tool uses, anchored at the origin. Shift or a
/// kind-declared ratio locks aspect. Escape deletes the work in progress.
#[derive(Debug)]
struct CreatingState {
    seed: SeedFn,
    shape: Option<ShapeId>,
    initial: Rect,
}

impl CreatingState {
    fn abandon(&mut self, app: &mut App) {
        if let Some(id) = self.shape.take() {
            app.delete_shapes(&[id]);
        }
        app.history.resume();
    }
}

impl StateBehavior for CreatingState {
    fn on_enter(&mut self, app: &mut App) {
        app.history.pause();
        let origin = app.inputs.origin_page;
        let model = (self.seed)(origin);
        let id = model.id.clone();
        match app.add_shapes(vec![model], None) {
            Ok(()) => {
                self.initial = app
                    .instances
                    .get(&id)
                    .map(|inst| inst.bounds)
                    .unwrap_or_else(|| Rect::from_origin_size(origin, (1.0, 1.0)));
                app.select_shapes(vec![id.clone()]);
                self.shape = Some(id);
            }
            Err(err) => {
                warn!("shape creation failed: {err}");
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
        let fixed = app
            .document
            .shape(&id)
            .and_then(|model| app.registry.get(&model.kind).ok().map(|k| (k, model)))
            .and_then(|(kind, model)| kind.fixed_aspect_ratio(model));
        let aspect = fixed.or(info.modifiers.shift.then_some(1.0));

        let delta = app.inputs.page_delta();
        let target = transform_bounds(self.initial, BoundsHandle::BottomRight, delta, aspect);
        let (crossed_x, crossed_y) = transform_crossed(self.initial, BoundsHandle::BottomRight, delta);
        let scale = Vec2::new(
            if crossed_x { -1.0 } else { 1.0 },
            if crossed_y { -1.0 } else { 1.0 },
        );

        let start = self.initial;
        if let Err(err) = app.mutate_shape(&id, |model, kind| {
            kind.resize(model, start, target, scale);
        }) {
            warn!("creation resize failed: {err}");
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
            self.abandon(app);
            return Some("idle");
        }
        None
    }
}
