//! Translate sessions: dragging shapes and dragging a shape's handle.

use crate::app::App;
use crate::input::{KeyInfo, Modifiers, PointerInfo};
use crate::shapes::{ShapeId, ShapeModel, ShapeUpdate};
use crate::state::StateBehavior;
use kurbo::{Point, Vec2};
use log::warn;
use std::collections::HashMap;

/// Active translate drag over the current selection.
///
/// History is paused for the whole gesture so the drag lands as one undo
/// step. Holding alt clones the selection in place and moves the clones;
/// releasing alt deletes them and goes back to moving the originals. Shift
/// locks movement to the dominant axis. Escape restores every start point.
#[derive(Debug, Default)]
pub struct TranslatingState {
    originals: Vec<ShapeId>,
    clones: Vec<ShapeId>,
    origins: HashMap<ShapeId, Point>,
    cloning: bool,
}

impl TranslatingState {
    fn locked_delta(&self, app: &App) -> Vec2 {
        let mut delta = app.inputs.page_delta();
        if app.inputs.modifiers.shift {
            // Lock the smaller-magnitude axis
            if delta.x.abs() > delta.y.abs() {
                delta.y = 0.0;
            } else {
                delta.x = 0.0;
            }
        }
        delta
    }

    fn active_ids(&self) -> &[ShapeId] {
        if self.cloning {
            &self.clones
        } else {
            &self.originals
        }
    }

    /// Reposition the active set relative to its recorded start points.
    fn apply(&self, app: &mut App) {
        let delta = self.locked_delta(app);
        let updates: Vec<ShapeUpdate> = self
            .active_ids()
            .iter()
            .filter_map(|id| {
                let origin = self.origins.get(id)?;
                Some(ShapeUpdate::new(id.clone()).point(*origin + delta))
            })
            .collect();
        app.update_shapes(updates);
    }

    /// Create or drop the clone set to match the alt key.
    fn sync_clones(&mut self, app: &mut App, alt: bool) {
        if alt && !self.cloning {
            // Originals snap back to their start points, clones take over
            let restore: Vec<ShapeUpdate> = self
                .originals
                .iter()
                .filter_map(|id| {
                    let origin = self.origins.get(id)?;
                    Some(ShapeUpdate::new(id.clone()).point(*origin))
                })
                .collect();
            app.update_shapes(restore);
            match app.clone_shapes(&self.originals) {
                Ok(clones) => {
                    for (clone, original) in clones.iter().zip(&self.originals) {
                        if let Some(origin) = self.origins.get(original).copied() {
                            self.origins.insert(clone.clone(), origin);
                        }
                    }
                    app.select_shapes(clones.clone());
                    self.clones = clones;
                    self.cloning = true;
                }
                Err(err) => warn!("clone during translate failed: {err}"),
            }
        } else if !alt && self.cloning {
            let clones = std::mem::take(&mut self.clones);
            app.delete_shapes(&clones);
            app.select_shapes(self.originals.clone());
            self.cloning = false;
        }
    }

    fn restore_originals(&self, app: &mut App) {
        let restore: Vec<ShapeUpdate> = self
            .originals
            .iter()
            .filter_map(|id| {
                let origin = self.origins.get(id)?;
                Some(ShapeUpdate::new(id.clone()).point(*origin))
            })
            .collect();
        app.update_shapes(restore);
    }
}

impl StateBehavior for TranslatingState {
    fn on_enter(&mut self, app: &mut App) {
        app.history.pause();
        self.originals = app.selected_ids.clone();
        self.origins = self
            .originals
            .iter()
            .filter_map(|id| Some((id.clone(), app.document.shape(id)?.point)))
            .collect();
        self.clones.clear();
        self.cloning = false;
    }

    fn on_exit(&mut self, _app: &mut App) {
        self.origins.clear();
        self.originals.clear();
        self.clones.clear();
        self.cloning = false;
    }

    fn on_pointer_move(&mut self, app: &mut App, info: &PointerInfo) -> Option<&'static str> {
        self.sync_clones(app, info.modifiers.alt);
        self.apply(app);
        None
    }

    fn on_modifier_change(&mut self, app: &mut App, modifiers: Modifiers) -> Option<&'static str> {
        self.sync_clones(app, modifiers.alt);
        self.apply(app);
        None
    }

    fn on_pointer_up(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        app.history.resume();
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            self.sync_clones(app, false);
            self.restore_originals(app);
            app.history.resume();
            return Some("idle");
        }
        None
    }
}

/// Active drag of one editable shape handle (line/draw endpoints).
#[derive(Debug, Default)]
pub struct TranslatingHandleState {
    snapshot: Option<ShapeModel>,
}

impl StateBehavior for TranslatingHandleState {
    fn on_enter(&mut self, app: &mut App) {
        app.history.pause();
        self.snapshot = app
            .active_shape_handle
            .as_ref()
            .and_then(|(id, _)| app.document.shape(id).cloned());
    }

    fn on_exit(&mut self, _app: &mut App) {
        self.snapshot = None;
    }

    fn on_pointer_move(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        let Some((id, index)) = app.active_shape_handle.clone() else {
            return None;
        };
        let point = app.inputs.current_page;
        if let Err(err) = app.mutate_shape(&id, |model, kind| {
            kind.on_handle_change(model, index, point);
        }) {
            warn!("handle drag failed: {err}");
        }
        None
    }

    fn on_pointer_up(&mut self, app: &mut App, _info: &PointerInfo) -> Option<&'static str> {
        app.history.resume();
        Some("idle")
    }

    fn on_key_down(&mut self, app: &mut App, info: &KeyInfo) -> Option<&'static str> {
        if info.key == "Escape" {
            if let Some(snapshot) = self.snapshot.take() {
                let id = snapshot.id.clone();
                if let Err(err) = app.mutate_shape(&id, move |model, _| *model = snapshot) {
                    warn!("handle revert failed: {err}");
                }
            }
            app.history.resume();
            return Some("idle");
        }
        None
    }
}
