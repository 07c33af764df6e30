//! The document and selection manager: single owner of all mutable state.
//!
//! Everything is synchronous and event-driven. Host events enter through the
//! `on_*` methods, flow through the tool state machine, and mutate the
//! document through the methods here; derived state (instances, selection
//! bounds, display flags) is recomputed before the call returns, so readers
//! never observe a mutation without its derived effects.

use crate::camera::{Camera, ZOOM_STEP};
use crate::error::{CoreError, Result};
use crate::geometry::{flip_bounds, BoundsHandle, FlipDirection};
use crate::history::History;
use crate::input::{InputState, KeyInfo, PinchInfo, PointerInfo, WheelInfo};
use crate::shapes::{ShapeId, ShapeInstance, ShapeKind, ShapeModel, ShapeRegistry, ShapeUpdate};
use crate::state::{Event, StateNode};
use crate::tools;
use kurbo::{Point, Rect, Size, Vec2};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The serializable document: an ordered list of shape models.
///
/// Order is z-order, last on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub shapes: Vec<ShapeModel>,
}

impl Document {
    pub fn shape(&self, id: &ShapeId) -> Option<&ShapeModel> {
        self.shapes.iter().find(|m| &m.id == id)
    }

    pub fn index_of(&self, id: &ShapeId) -> Option<usize> {
        self.shapes.iter().position(|m| &m.id == id)
    }
}

/// Cursor the host should display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorKind {
    #[default]
    Default,
    Pointer,
    Move,
    Crosshair,
    Text,
    Grab,
    ResizeEw,
    ResizeNs,
    ResizeNesw,
    ResizeNwse,
    Rotate,
}

/// Read-only flags the rendering layer consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayState {
    pub show_selection: bool,
    pub show_resize_handles: bool,
    pub show_rotate_handles: bool,
    pub show_context_bar: bool,
    pub cursor: CursorKind,
    /// Rotation applied to directional cursors over a rotated selection.
    pub cursor_rotation: f64,
}

/// The editor core.
pub struct App {
    pub document: Document,
    /// Runtime wrapper per document shape, reconciled after every mutation.
    pub instances: HashMap<ShapeId, ShapeInstance>,
    pub registry: ShapeRegistry,
    /// Selected ids in selection order.
    pub selected_ids: Vec<ShapeId>,
    pub hovered_id: Option<ShapeId>,
    pub editing_id: Option<ShapeId>,
    /// Transient brush rectangle, present only during a brush session.
    pub brush: Option<Rect>,
    /// Shapes marked by an active erase session, deleted on commit.
    pub erasing_ids: Vec<ShapeId>,
    pub camera: Camera,
    pub viewport: Size,
    pub inputs: InputState,
    pub history: History,
    pub display: DisplayState,
    pub current_tool: &'static str,
    /// When set, creation tools stay active after committing.
    pub is_tool_locked: bool,
    /// Selection-cage handle recorded when a resize/rotate phase starts.
    pub active_handle: Option<BoundsHandle>,
    /// Shape handle recorded when a handle-drag phase starts.
    pub active_shape_handle: Option<(ShapeId, usize)>,
    root: Option<StateNode>,
    pending_tool: Option<&'static str>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let document = Document::default();
        let history = match serde_json::to_value(&document) {
            Ok(snapshot) => History::new(snapshot),
            Err(_) => History::new(serde_json::Value::Null),
        };
        let mut app = Self {
            document,
            instances: HashMap::new(),
            registry: ShapeRegistry::with_defaults(),
            selected_ids: Vec::new(),
            hovered_id: None,
            editing_id: None,
            brush: None,
            erasing_ids: Vec::new(),
            camera: Camera::new(),
            viewport: Size::new(1080.0, 720.0),
            inputs: InputState::new(),
            history,
            display: DisplayState::default(),
            current_tool: "select",
            is_tool_locked: false,
            active_handle: None,
            active_shape_handle: None,
            root: None,
            pending_tool: None,
        };
        let mut root = tools::root_node();
        if let Err(err) = root.enter(&mut app) {
            warn!("tool tree failed to start: {err}");
        }
        app.root = Some(root);
        app.update_derived();
        app
    }

    // ---- event surface ----------------------------------------------------

    pub fn on_pointer_down(&mut self, info: PointerInfo) {
        let page = self.camera.screen_to_page(info.point);
        self.inputs.on_pointer_down(info.point, page, &info);
        self.dispatch(Event::PointerDown(&info));
    }

    pub fn on_pointer_move(&mut self, info: PointerInfo) {
        let page = self.camera.screen_to_page(info.point);
        self.inputs.on_pointer_move(info.point, page, info.modifiers);
        self.dispatch(Event::PointerMove(&info));
    }

    pub fn on_pointer_up(&mut self, info: PointerInfo) {
        let page = self.camera.screen_to_page(info.point);
        self.inputs.on_pointer_move(info.point, page, info.modifiers);
        // States still read the pointer-down target while handling the
        // release, so the interaction closes only after dispatch
        self.dispatch(Event::PointerUp(&info));
        self.inputs.end_interaction();
    }

    pub fn on_double_click(&mut self, info: PointerInfo) {
        let page = self.camera.screen_to_page(info.point);
        self.inputs.on_pointer_move(info.point, page, info.modifiers);
        self.dispatch(Event::DoubleClick(&info));
    }

    pub fn on_key_down(&mut self, info: KeyInfo) {
        let changed = self.inputs.modifiers != info.modifiers;
        self.inputs.modifiers = info.modifiers;
        self.dispatch(Event::KeyDown(&info));
        if changed {
            self.dispatch(Event::ModifierChange(info.modifiers));
        }
    }

    pub fn on_key_up(&mut self, info: KeyInfo) {
        let changed = self.inputs.modifiers != info.modifiers;
        self.inputs.modifiers = info.modifiers;
        self.dispatch(Event::KeyUp(&info));
        if changed {
            self.dispatch(Event::ModifierChange(info.modifiers));
        }
    }

    /// Scroll pans the canvas; with the platform modifier held it zooms.
    pub fn on_wheel(&mut self, info: WheelInfo) {
        if info.modifiers.platform() {
            let factor = if info.delta.y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
            self.camera.zoom_at(info.point, factor);
        } else {
            self.camera.pan(-info.delta);
        }
        self.dispatch(Event::Wheel(&info));
    }

    pub fn on_pinch(&mut self, info: PinchInfo) {
        self.dispatch(Event::Pinch(&info));
    }

    fn dispatch(&mut self, event: Event<'_>) {
        if let Some(mut root) = self.root.take() {
            if let Err(err) = root.dispatch(self, event) {
                warn!("event dispatch failed: {err}");
            }
            self.root = Some(root);
        }
        if let Some(tool) = self.pending_tool.take() {
            if let Err(err) = self.set_tool(tool) {
                warn!("deferred tool switch failed: {err}");
            }
        }
        self.update_derived();
    }

    // ---- tools ------------------------------------------------------------

    /// Switch the active tool.
    pub fn set_tool(&mut self, tool: &'static str) -> Result<()> {
        let Some(mut root) = self.root.take() else {
            // A state requested a switch mid-dispatch; apply it afterwards
            self.pending_tool = Some(tool);
            return Ok(());
        };
        let result = root.transition(tool, self);
        self.root = Some(root);
        result?;
        self.current_tool = tool;
        self.update_derived();
        Ok(())
    }

    /// Request a tool switch from inside a state handler.
    ///
    /// Applied after the current event finishes dispatching.
    pub fn request_tool(&mut self, tool: &'static str) {
        self.pending_tool = Some(tool);
    }

    /// Whether the dotted state path is active, e.g. `"select.translating"`.
    pub fn is_in(&self, path: &str) -> bool {
        self.root.as_ref().is_some_and(|root| root.is_in(path))
    }

    /// Active state ids from tool to leaf.
    pub fn active_path(&self) -> Vec<&'static str> {
        self.root.as_ref().map(StateNode::active_path).unwrap_or_default()
    }

    // ---- document mutation ------------------------------------------------

    /// Insert shapes at `index` (default: end of the document, topmost).
    ///
    /// Fails without touching the document if any model names an
    /// unregistered kind.
    pub fn add_shapes(&mut self, models: Vec<ShapeModel>, index: Option<usize>) -> Result<()> {
        let mut validated = Vec::with_capacity(models.len());
        for mut model in models {
            let kind = self.registry.get(&model.kind)?.clone();
            kind.validate(&mut model);
            validated.push(model);
        }
        let at = index.unwrap_or(self.document.shapes.len()).min(self.document.shapes.len());
        for (offset, model) in validated.into_iter().enumerate() {
            let instance = ShapeInstance::new(model.clone(), &self.registry)?;
            self.instances.insert(model.id.clone(), instance);
            self.document.shapes.insert(at + offset, model);
        }
        self.persist();
        self.update_derived();
        Ok(())
    }

    /// Merge partial updates into existing models.
    ///
    /// Unknown ids are logged and skipped, not errors.
    pub fn update_shapes(&mut self, updates: Vec<ShapeUpdate>) {
        for update in updates {
            let Some(idx) = self.document.index_of(&update.id) else {
                warn!("update for unknown shape {} ignored", update.id);
                continue;
            };
            let Ok(kind) = self.registry.get(&self.document.shapes[idx].kind).cloned() else {
                continue;
            };
            let model = &mut self.document.shapes[idx];
            update.merge_into(model);
            kind.validate(model);
            self.refresh_instance(idx);
        }
        self.persist();
        self.update_derived();
    }

    /// Mutate one model in place with access to its kind behavior.
    pub fn mutate_shape(
        &mut self,
        id: &ShapeId,
        f: impl FnOnce(&mut ShapeModel, &dyn ShapeKind),
    ) -> Result<()> {
        let idx = self
            .document
            .index_of(id)
            .ok_or_else(|| CoreError::ShapeNotFound(id.clone()))?;
        let kind: Arc<dyn ShapeKind> = self.registry.get(&self.document.shapes[idx].kind)?.clone();
        let model = &mut self.document.shapes[idx];
        f(model, kind.as_ref());
        kind.validate(model);
        self.refresh_instance(idx);
        self.persist();
        self.update_derived();
        Ok(())
    }

    /// Remove shapes from the document and the selection in one step.
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) {
        let set: HashSet<&ShapeId> = ids.iter().collect();
        self.document.shapes.retain(|m| !set.contains(&m.id));
        self.instances.retain(|id, _| !set.contains(id));
        self.selected_ids.retain(|id| !set.contains(id));
        self.erasing_ids.retain(|id| !set.contains(id));
        if self.hovered_id.as_ref().is_some_and(|id| set.contains(id)) {
            self.hovered_id = None;
        }
        if self.editing_id.as_ref().is_some_and(|id| set.contains(id)) {
            self.editing_id = None;
        }
        self.persist();
        self.update_derived();
    }

    /// Clone shapes in place, returning the new ids in input order.
    pub fn clone_shapes(&mut self, ids: &[ShapeId]) -> Result<Vec<ShapeId>> {
        let mut clones = Vec::with_capacity(ids.len());
        for id in ids {
            let model = self
                .document
                .shape(id)
                .ok_or_else(|| CoreError::ShapeNotFound(id.clone()))?
                .clone_with_new_id();
            clones.push(model);
        }
        let new_ids: Vec<ShapeId> = clones.iter().map(|m| m.id.clone()).collect();
        self.add_shapes(clones, None)?;
        Ok(new_ids)
    }

    // ---- reordering -------------------------------------------------------

    /// Move each shape one step toward the top, as a block.
    ///
    /// Members never pass through each other; a member only swaps with a
    /// non-member above it.
    pub fn bring_forward(&mut self, ids: &[ShapeId]) {
        let set: HashSet<&ShapeId> = ids.iter().collect();
        let indices: Vec<usize> = self.member_indices(&set);
        for &i in indices.iter().rev() {
            if i + 1 < self.document.shapes.len() && !set.contains(&self.document.shapes[i + 1].id) {
                self.document.shapes.swap(i, i + 1);
            }
        }
        self.persist();
        self.update_derived();
    }

    /// Move each shape one step toward the bottom, as a block.
    pub fn send_backward(&mut self, ids: &[ShapeId]) {
        let set: HashSet<&ShapeId> = ids.iter().collect();
        let indices: Vec<usize> = self.member_indices(&set);
        for &i in &indices {
            if i > 0 && !set.contains(&self.document.shapes[i - 1].id) {
                self.document.shapes.swap(i, i - 1);
            }
        }
        self.persist();
        self.update_derived();
    }

    /// Move the shapes to the top of the document, preserving their order.
    pub fn bring_to_front(&mut self, ids: &[ShapeId]) {
        let set: HashSet<&ShapeId> = ids.iter().collect();
        let (mut rest, moved): (Vec<_>, Vec<_>) = std::mem::take(&mut self.document.shapes)
            .into_iter()
            .partition(|m| !set.contains(&m.id));
        rest.extend(moved);
        self.document.shapes = rest;
        self.persist();
        self.update_derived();
    }

    /// Move the shapes to the bottom of the document, preserving their order.
    pub fn send_to_back(&mut self, ids: &[ShapeId]) {
        let set: HashSet<&ShapeId> = ids.iter().collect();
        let (mut moved, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.document.shapes)
            .into_iter()
            .partition(|m| set.contains(&m.id));
        moved.extend(rest);
        self.document.shapes = moved;
        self.persist();
        self.update_derived();
    }

    fn member_indices(&self, set: &HashSet<&ShapeId>) -> Vec<usize> {
        self.document
            .shapes
            .iter()
            .enumerate()
            .filter(|(_, m)| set.contains(&m.id))
            .map(|(i, _)| i)
            .collect()
    }

    // ---- transforms -------------------------------------------------------

    /// Reflect shapes across their combined bounding box's center axis.
    ///
    /// The reflection goes through each kind's own `resize` with a negative
    /// scale component, so point-based kinds mirror their geometry.
    pub fn flip(&mut self, direction: FlipDirection, ids: &[ShapeId]) -> Result<()> {
        let mut group: Option<Rect> = None;
        for id in ids {
            let instance = self
                .instances
                .get(id)
                .ok_or_else(|| CoreError::ShapeNotFound(id.clone()))?;
            group = Some(match group {
                Some(rect) => rect.union(instance.bounds),
                None => instance.bounds,
            });
        }
        let Some(group) = group else { return Ok(()) };

        let scale = match direction {
            FlipDirection::Horizontal => Vec2::new(-1.0, 1.0),
            FlipDirection::Vertical => Vec2::new(1.0, -1.0),
        };
        for id in ids {
            let idx = self
                .document
                .index_of(id)
                .ok_or_else(|| CoreError::ShapeNotFound(id.clone()))?;
            let kind = self.registry.get(&self.document.shapes[idx].kind)?.clone();
            let model = &mut self.document.shapes[idx];
            let bounds = kind.bounds(model);
            let target = flip_bounds(bounds, group, direction);
            kind.resize(model, bounds, target, scale);
            kind.validate(model);
            self.refresh_instance(idx);
        }
        self.persist();
        self.update_derived();
        Ok(())
    }

    // ---- selection --------------------------------------------------------

    /// Replace the selection, deduplicating while keeping order.
    pub fn select_shapes(&mut self, ids: Vec<ShapeId>) {
        let mut seen = HashSet::new();
        self.selected_ids = ids
            .into_iter()
            .filter(|id| self.instances.contains_key(id) && seen.insert(id.clone()))
            .collect();
        self.update_derived();
    }

    pub fn select_all(&mut self) {
        self.selected_ids = self.document.shapes.iter().map(|m| m.id.clone()).collect();
        self.update_derived();
    }

    pub fn deselect_all(&mut self) {
        self.selected_ids.clear();
        self.update_derived();
    }

    pub fn set_hovered(&mut self, id: Option<ShapeId>) {
        self.hovered_id = id.filter(|id| self.instances.contains_key(id));
    }

    pub fn set_editing(&mut self, id: Option<ShapeId>) {
        self.editing_id = id.filter(|id| self.instances.contains_key(id));
        self.update_derived();
    }

    /// Selected instances in selection order.
    pub fn selected_shapes(&self) -> Vec<&ShapeInstance> {
        self.selected_ids
            .iter()
            .filter_map(|id| self.instances.get(id))
            .collect()
    }

    /// The selection cage rectangle.
    ///
    /// A single shape uses its own rotated bounds; multiple shapes use the
    /// union of all rotated bounds.
    pub fn selection_bounds(&self) -> Option<Rect> {
        let selected = self.selected_shapes();
        match selected.as_slice() {
            [] => None,
            [only] => Some(only.rotated_bounds),
            [first, rest @ ..] => Some(
                rest.iter()
                    .fold(first.rotated_bounds, |acc, s| acc.union(s.rotated_bounds)),
            ),
        }
    }

    // ---- queries ----------------------------------------------------------

    /// Topmost visible shape whose geometry contains the page-space point.
    pub fn shape_at_point(&self, point: Point, tolerance: f64) -> Option<&ShapeInstance> {
        self.document.shapes.iter().rev().find_map(|model| {
            if model.is_hidden {
                return None;
            }
            let kind = self.registry.get(&model.kind).ok()?;
            if kind.hit_test_point(model, point, tolerance) {
                self.instances.get(&model.id)
            } else {
                None
            }
        })
    }

    /// Instances whose rotated bounds intersect the camera's view, in
    /// document order.
    pub fn shapes_in_viewport(&self) -> Vec<&ShapeInstance> {
        let view = self.camera.viewport_rect(self.viewport);
        self.document
            .shapes
            .iter()
            .filter_map(|m| self.instances.get(&m.id))
            .filter(|inst| view.intersect(inst.rotated_bounds.inflate(1.0, 1.0)).area() > 0.0)
            .collect()
    }

    /// Union of every shape's rotated bounds.
    pub fn document_bounds(&self) -> Option<Rect> {
        self.document
            .shapes
            .iter()
            .filter_map(|m| self.instances.get(&m.id))
            .map(|inst| inst.rotated_bounds)
            .reduce(|acc, r| acc.union(r))
    }

    // ---- history ----------------------------------------------------------

    /// Serialize the document into the history manager.
    pub fn persist(&mut self) {
        match serde_json::to_value(&self.document) {
            Ok(snapshot) => self.history.persist(snapshot),
            Err(err) => warn!("document failed to serialize: {err}"),
        }
    }

    pub fn undo(&mut self) {
        if let Some(snapshot) = self.history.undo() {
            self.restore(snapshot);
        }
    }

    pub fn redo(&mut self) {
        if let Some(snapshot) = self.history.redo() {
            self.restore(snapshot);
        }
    }

    fn restore(&mut self, snapshot: serde_json::Value) {
        match serde_json::from_value::<Document>(snapshot) {
            Ok(document) => {
                self.document = document;
                if let Err(err) = self.reconcile() {
                    warn!("instance reconciliation failed: {err}");
                }
                let ids: HashSet<&ShapeId> = self.instances.keys().collect();
                self.selected_ids.retain(|id| ids.contains(id));
                drop(ids);
                // Persist the reload so the history absorbs it as the
                // undo/redo side effect rather than the next real mutation
                self.persist();
                self.update_derived();
            }
            Err(err) => warn!("history snapshot failed to deserialize: {err}"),
        }
    }

    /// Rebuild the instance map to match the document.
    fn reconcile(&mut self) -> Result<()> {
        let live: HashSet<ShapeId> = self.document.shapes.iter().map(|m| m.id.clone()).collect();
        self.instances.retain(|id, _| live.contains(id));
        let models: Vec<ShapeModel> = self.document.shapes.clone();
        for model in models {
            match self.instances.get_mut(&model.id) {
                Some(instance) => {
                    if instance.model != model {
                        instance.model = model;
                        instance.refresh(&self.registry)?;
                    }
                }
                None => {
                    let instance = ShapeInstance::new(model.clone(), &self.registry)?;
                    self.instances.insert(model.id.clone(), instance);
                }
            }
        }
        Ok(())
    }

    fn refresh_instance(&mut self, idx: usize) {
        let model = self.document.shapes[idx].clone();
        let id = model.id.clone();
        match self.instances.get_mut(&id) {
            Some(instance) => {
                instance.model = model;
                if let Err(err) = instance.refresh(&self.registry) {
                    warn!("instance refresh failed for {id}: {err}");
                }
            }
            None => match ShapeInstance::new(model, &self.registry) {
                Ok(instance) => {
                    self.instances.insert(id, instance);
                }
                Err(err) => warn!("instance build failed for {id}: {err}"),
            },
        }
    }

    // ---- camera -----------------------------------------------------------

    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
    }

    pub fn zoom_in(&mut self) {
        let center = Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
        self.camera.zoom_at(center, ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        let center = Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
        self.camera.zoom_at(center, 1.0 / ZOOM_STEP);
    }

    pub fn zoom_to_fit(&mut self) {
        if let Some(bounds) = self.document_bounds() {
            self.camera.fit_to_bounds(bounds, self.viewport, 32.0);
        }
    }

    pub fn zoom_to_selection(&mut self) {
        if let Some(bounds) = self.selection_bounds() {
            self.camera.fit_to_bounds(bounds, self.viewport, 32.0);
        }
    }

    // ---- derived state ----------------------------------------------------

    /// Recompute display flags from the current tool, states, and selection.
    fn update_derived(&mut self) {
        let has_selection = !self.selected_ids.is_empty();
        let in_select = self.current_tool == "select";
        let in_session = ["translating", "resizing", "rotating", "brushing", "translating_handle", "pinching"]
            .iter()
            .any(|phase| self.is_in(&format!("select.{phase}")));

        let all_resizable = self.selected_ids.iter().all(|id| {
            self.instances
                .get(id)
                .and_then(|inst| self.registry.get(&inst.model.kind).ok())
                .map_or(true, |kind| kind.can_resize())
        });

        let show_selection = in_select && has_selection && !self.is_in("select.brushing");
        self.display.show_selection = show_selection;
        self.display.show_resize_handles = show_selection && !in_session && all_resizable;
        self.display.show_rotate_handles = show_selection && !in_session;
        self.display.show_context_bar = show_selection && self.is_in("select.idle");

        self.display.cursor = self.derive_cursor();
        self.display.cursor_rotation = match self.selected_shapes().as_slice() {
            [only] => only.model.rotation,
            _ => 0.0,
        };
    }

    fn derive_cursor(&self) -> CursorKind {
        match self.current_tool {
            "select" => {
                if self.is_in("select.translating") || self.is_in("select.translating_handle") {
                    CursorKind::Move
                } else if self.is_in("select.brushing") {
                    CursorKind::Crosshair
                } else if self.is_in("select.rotating") {
                    CursorKind::Rotate
                } else if self.is_in("select.resizing") {
                    match self.active_handle {
                        Some(BoundsHandle::Top | BoundsHandle::Bottom) => CursorKind::ResizeNs,
                        Some(BoundsHandle::Left | BoundsHandle::Right) => CursorKind::ResizeEw,
                        Some(BoundsHandle::TopLeft | BoundsHandle::BottomRight) => CursorKind::ResizeNwse,
                        Some(BoundsHandle::TopRight | BoundsHandle::BottomLeft) => CursorKind::ResizeNesw,
                        _ => CursorKind::Default,
                    }
                } else if self.hovered_id.is_some() {
                    CursorKind::Pointer
                } else {
                    CursorKind::Default
                }
            }
            "text" => CursorKind::Text,
            _ => CursorKind::Crosshair,
        }
    }
}
