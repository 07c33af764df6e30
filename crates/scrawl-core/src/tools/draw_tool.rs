//! Freehand drawing tool.

use crate::app::App;
use crate::geometry::simplify_polyline;
use crate::input::{KeyInfo, PointerInfo};
use crate::shapes::{draw, ShapeId, ShapeModel, ShapeProps};
use crate::state::{Passive, StateBehavior, StateNode};
use kurbo::Point;
use log::warn;

const DEFAULT_PRESSURE: f64 = 0.5;
const SIMPLIFY_TOLERANCE: f64 = 0.5;
/// Page-space spacing of interpolated bridge samples on shift-extend.
const BRIDGE_STEP: f64 = 4.0;

pub fn draw_tool() -> StateNode {
    StateNode::new("draw", Box::new(Passive))
        .with_initial("idle")
        .with_children(vec![
            StateNode::new("idle", Box::new(IdleState)),
            StateNode::new(
                "creating",
                Box::new(CreatingState {
                    shape: None,
                    snapshot: None,
                }),
            ),
        ])
}

#[derive(Debug)]
struct IdleState;

impl StateBehavior for IdleState {
    fn on_pointer_down(&mut self, _app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        Some("creating")
    }
}

/// Active stroke.
///
/// Samples accumulate into the shape as `[x, y, pressure]`. Starting with
/// shift while a finished stroke exists extends that stroke through an
/// interpolated bridge instead of creating a new shape. Release simplifies
/// the trail and marks it complete.
#[derive(Debug)]
struct CreatingState {
    shape: Option<ShapeId>,
    /// Pre-extension model when continuing an earlier stroke.
    snapshot: Option<ShapeModel>,
}

impl CreatingState {
    fn last_stroke(app: &App) -> Option<&ShapeModel> {
        app.document.shapes.iter().rev().find(|m| {
            matches!(m.props, ShapeProps::Draw { is_complete, .. } if is_complete)
        })
    }
}

impl StateBehavior for CreatingState {
    fn on_enter(&mut self, app: &mut App) {
        app.history.pause();
        let origin = app.inputs.origin_page;
        self.snapshot = None;

        if app.inputs.modifiers.shift {
            if let Some(previous) = Self::last_stroke(app) {
                let id = previous.id.clone();
                self.snapshot = Some(previous.clone());
                let tail = draw::page_points(previous).last().copied();
                let result = app.mutate_shape(&id, |model, _| {
                    let mut samples = Vec::new();
                    if let Some(tail) = tail {
                        let dist = (origin - tail).hypot();
                        let steps = (dist / BRIDGE_STEP).ceil().max(1.0) as usize;
                        for i in 1..steps {
                            let t = i as f64 / steps as f64;
                            samples.push([
                                tail.x + (origin.x - tail.x) * t,
                                tail.y + (origin.y - tail.y) * t,
                                DEFAULT_PRESSURE,
                            ]);
                        }
                    }
                    samples.push([origin.x, origin.y, DEFAULT_PRESSURE]);
                    if let ShapeProps::Draw { is_complete, .. } = &mut model.props {
                        *is_complete = false;
                    }
                    draw::extend_stroke(model, &samples);
                });
                match result {
                    Ok(()) => {
                        app.select_shapes(vec![id.clone()]);
                        self.shape = Some(id);
                        return;
                    }
                    Err(err) => warn!("stroke extension failed: {err}"),
                }
            }
        }

        let model = ShapeModel::new(
            "draw",
            origin,
            ShapeProps::Draw {
                points: vec![[0.0, 0.0, DEFAULT_PRESSURE]],
                is_complete: false,
            },
        );
        let id = model.id.clone();
        match app.add_shapes(vec![model], None) {
            Ok(()) => {
                app.select_shapes(vec![id.clone()]);
                self.shape = Some(id);
            }
            Err(err) => {
                warn!("stroke creation failed: {err}");
                self.shape = None;
            }
        }
    }

    fn on_exit(&mut self, _app: &mut App) {
        self.shape = None;
        self.snapshot = None;
    }

    fn on_pointer_move(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        let Some(id) = self.shape.clone() else {
            return None;
        };
        let page = app.inputs.current_page;
        let pressure = info.pressure.unwrap_or(DEFAULT_PRESSURE);
        if let Err(err) = app.mutate_shape(&id, |model, _| {
            draw::extend_stroke(model, &[[page.x, page.y, pressure]]);
        }) {
            warn!("stroke sample failed: {err}");
        }
        None
    }

    fn on_pointer_up(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        if let Some(id) = self.shape.clone() {
            if let Err(err) = app.mutate_shape(&id, |model, _| {
                if let ShapeProps::Draw { points, .. } = &model.props {
                    let page: Vec<Point> = points
                        .iter()
                        .map(|[x, y, _]| Point::new(model.point.x + x, model.point.y + y))
                        .collect();
                    let kept = simplify_polyline(&page, SIMPLIFY_TOLERANCE);
                    // Carry each survivor's pressure over by matching position
                    let mut reduced = Vec::with_capacity(kept.len());
                    let mut cursor = 0;
                    for point in kept {
                        while cursor < page.len() {
                            let candidate = page[cursor];
                            let sample = points[cursor];
                            cursor += 1;
                            if candidate == point {
                                reduced.push(sample);
                                break;
                            }
                        }
                    }
                    model.props = ShapeProps::Draw {
                        points: reduced,
                        is_complete: true,
                    };
                }
            }) {
                warn!("stroke completion failed: {err}");
            }
        }
        app.history.resume();
        if !app.is_tool_locked {
            app.request_tool("select");
        }
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            if let Some(id) = self.shape.take() {
                match self.snapshot.take() {
                    // Extension session: put the earlier stroke back
                    Some(snapshot) => {
                        if let Err(err) = app.mutate_shape(&id, move |model, _| *model = snapshot) {
                            warn!("stroke revert failed: {err}");
                        }
                    }
                    None => app.delete_shapes(&[id]),
                }
            }
            app.history.resume();
            return Some("idle");
        }
        None
    }
}
