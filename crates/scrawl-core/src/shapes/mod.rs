//! Shape contract: serializable models, per-kind behavior, and the registry.
//!
//! A shape is a plain data record (`ShapeModel`) whose `kind` selects an
//! algorithm table (`ShapeKind`) from the registry. There is no inheritance
//! between kinds; capabilities (bounds, hit tests, resize, handle editing)
//! are free functions on the kind object, and derived geometry is cached on
//! the runtime `ShapeInstance`.

mod box_shape;
mod dot;
pub mod draw;
mod line;
mod polygon;
mod text;

pub use box_shape::BoxKind;
pub use dot::DotKind;
pub use draw::DrawKind;
pub use line::LineKind;
pub use polygon::PolygonKind;
pub use text::TextKind;

use crate::error::{CoreError, Result};
use crate::geometry::{rect_contains_rect, rotate_point, rotated_bounds};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Geometric fields never drop below this during validation.
pub const MIN_SIZE: f64 = 1.0;

/// Unique identifier for a shape within a document.
///
/// Ids are plain strings so host-assigned ids round-trip through JSON;
/// `generate` produces a fresh v4 UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    /// Generate a fresh unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShapeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ShapeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializable RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

/// Style properties shared by every shape kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: Color,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<Color>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

impl ShapeStyle {
    /// Clamp style fields into their valid ranges.
    pub fn clamp(&mut self) {
        self.stroke_width = self.stroke_width.max(0.1);
        self.opacity = self.opacity.clamp(0.0, 1.0);
    }
}

/// Type-specific model fields, one variant per built-in kind.
///
/// Untagged: the adjacent `type` field on the model names the kind, and the
/// variants' required fields keep deserialization unambiguous. `Custom` must
/// stay last — it catches payloads for host-registered kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeProps {
    /// Regular or star polygon inscribed in a size box.
    Polygon {
        size: [f64; 2],
        sides: u32,
        /// Inner-vertex radius ratio; 1.0 draws a regular polygon,
        /// smaller values draw a star.
        ratio: f64,
    },
    /// Editable text block.
    Text { text: String, size: [f64; 2] },
    /// Axis-aligned box.
    Box { size: [f64; 2] },
    /// Circle described by its radius.
    Dot { radius: f64 },
    /// Polyline through a list of handles relative to the shape origin.
    Line { handles: Vec<[f64; 2]> },
    /// Freehand stroke; points are `[x, y, pressure]` relative to origin.
    Draw {
        points: Vec<[f64; 3]>,
        #[serde(default)]
        is_complete: bool,
    },
    /// Payload for a host-registered kind.
    Custom(serde_json::Value),
}

/// Serializable data record for one drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeModel {
    pub id: ShapeId,
    /// Must match a registered shape kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Position of the shape origin (top-left of its bounds) in page space.
    pub point: Point,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub is_hidden: bool,
    /// Transient display flag, e.g. shapes marked by an erase session.
    #[serde(default)]
    pub is_ghost: bool,
    #[serde(default)]
    pub is_aspect_ratio_locked: bool,
    #[serde(default)]
    pub style: ShapeStyle,
    pub props: ShapeProps,
}

impl ShapeModel {
    /// Create a model of the given kind at a point.
    pub fn new(kind: impl Into<String>, point: Point, props: ShapeProps) -> Self {
        Self {
            id: ShapeId::generate(),
            kind: kind.into(),
            point,
            rotation: 0.0,
            scale: None,
            name: None,
            is_locked: false,
            is_hidden: false,
            is_ghost: false,
            is_aspect_ratio_locked: false,
            style: ShapeStyle::default(),
            props,
        }
    }

    /// Same model with a caller-chosen id.
    pub fn with_id(mut self, id: impl Into<ShapeId>) -> Self {
        self.id = id.into();
        self
    }

    /// Clone this model under a freshly generated id.
    pub fn clone_with_new_id(&self) -> Self {
        let mut clone = self.clone();
        clone.id = ShapeId::generate();
        clone
    }
}

/// Partial change merged into an existing model by `update_shapes`.
#[derive(Debug, Clone)]
pub struct ShapeUpdate {
    pub id: ShapeId,
    pub point: Option<Point>,
    pub rotation: Option<f64>,
    pub props: Option<ShapeProps>,
    pub style: Option<ShapeStyle>,
    pub is_locked: Option<bool>,
    pub is_hidden: Option<bool>,
    pub is_ghost: Option<bool>,
    pub is_aspect_ratio_locked: Option<bool>,
}

impl ShapeUpdate {
    /// An empty update for the given shape.
    pub fn new(id: impl Into<ShapeId>) -> Self {
        Self {
            id: id.into(),
            point: None,
            rotation: None,
            props: None,
            style: None,
            is_locked: None,
            is_hidden: None,
            is_ghost: None,
            is_aspect_ratio_locked: None,
        }
    }

    pub fn point(mut self, point: Point) -> Self {
        self.point = Some(point);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn props(mut self, props: ShapeProps) -> Self {
        self.props = Some(props);
        self
    }

    /// Merge this update into a model. Validation runs separately.
    pub fn merge_into(&self, model: &mut ShapeModel) {
        if let Some(point) = self.point {
            model.point = point;
        }
        if let Some(rotation) = self.rotation {
            model.rotation = rotation;
        }
        if let Some(props) = &self.props {
            model.props = props.clone();
        }
        if let Some(style) = &self.style {
            model.style = style.clone();
        }
        if let Some(v) = self.is_locked {
            model.is_locked = v;
        }
        if let Some(v) = self.is_hidden {
            model.is_hidden = v;
        }
        if let Some(v) = self.is_ghost {
            model.is_ghost = v;
        }
        if let Some(v) = self.is_aspect_ratio_locked {
            model.is_aspect_ratio_locked = v;
        }
    }
}

/// Behavior table for one shape kind.
///
/// Every geometric capability a tool needs from a shape goes through this
/// trait; the registry maps `ShapeModel::kind` to an implementation.
pub trait ShapeKind: Send + Sync + fmt::Debug {
    /// The kind string models reference.
    fn kind(&self) -> &'static str;

    /// Unrotated bounding box in page space.
    fn bounds(&self, model: &ShapeModel) -> Rect;

    /// Whether a page-space point hits the shape.
    fn hit_test_point(&self, model: &ShapeModel, point: Point, tolerance: f64) -> bool;

    /// Whether the shape's geometry intersects a page-space rectangle.
    fn hit_test_rect(&self, model: &ShapeModel, rect: Rect) -> bool;

    /// Whether the shape is fully contained in a page-space rectangle.
    fn contained_in_rect(&self, model: &ShapeModel, rect: Rect) -> bool {
        rect_contains_rect(rect, rotated_bounds(self.bounds(model), model.rotation))
    }

    /// Fit the shape into `new_bounds` given its session-start bounds.
    ///
    /// `scale` carries the per-axis scale factors including sign; negative
    /// components mirror point-based geometry inside the new box.
    fn resize(&self, model: &mut ShapeModel, initial_bounds: Rect, new_bounds: Rect, scale: Vec2);

    /// Move one editable handle to a page-space point.
    fn on_handle_change(&self, _model: &mut ShapeModel, _index: usize, _point: Point) {}

    /// Editable handle positions in page space, empty for box-like kinds.
    fn handles(&self, _model: &ShapeModel) -> Vec<Point> {
        Vec::new()
    }

    /// Clamp/normalize model fields after any mutation.
    fn validate(&self, model: &mut ShapeModel);

    /// Whether resize sessions may change this shape's dimensions.
    fn can_resize(&self) -> bool {
        true
    }

    /// Whether resize may change the width:height ratio.
    fn can_change_aspect_ratio(&self) -> bool {
        true
    }

    /// A ratio the creation drag must keep, if the kind declares one.
    fn fixed_aspect_ratio(&self, _model: &ShapeModel) -> Option<f64> {
        None
    }

    /// Whether double-click opens an editing session (text).
    fn can_edit(&self) -> bool {
        false
    }
}

/// Transform a page-space point into the shape's unrotated local frame.
///
/// Shared by kinds that hit-test against unrotated geometry.
pub(crate) fn to_local(point: Point, bounds: Rect, rotation: f64) -> Point {
    if rotation == 0.0 {
        point
    } else {
        rotate_point(point, bounds.center(), -rotation)
    }
}

/// Registry mapping kind strings to behavior tables.
///
/// Stays a string-keyed lookup (not a closed enum) so host applications can
/// register additional kinds at startup.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    kinds: HashMap<String, Arc<dyn ShapeKind>>,
}

impl ShapeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in kind.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(BoxKind));
        registry.register(Arc::new(DotKind));
        registry.register(Arc::new(PolygonKind));
        registry.register(Arc::new(LineKind));
        registry.register(Arc::new(DrawKind));
        registry.register(Arc::new(TextKind));
        registry
    }

    /// Register a kind, replacing any previous entry for its string.
    pub fn register(&mut self, kind: Arc<dyn ShapeKind>) {
        self.kinds.insert(kind.kind().to_string(), kind);
    }

    /// Look up the behavior for a kind string.
    pub fn get(&self, kind: &str) -> Result<&Arc<dyn ShapeKind>> {
        self.kinds
            .get(kind)
            .ok_or_else(|| CoreError::UnregisteredShapeType(kind.to_string()))
    }

    /// Whether a kind string is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }
}

/// Runtime wrapper pairing a model with derived geometry.
///
/// Instances are owned exclusively by the app's instance map, created when a
/// model enters the document and dropped when it leaves.
#[derive(Debug, Clone)]
pub struct ShapeInstance {
    pub model: ShapeModel,
    /// Unrotated bounding box.
    pub bounds: Rect,
    /// Axis-aligned box of the rotated corners.
    pub rotated_bounds: Rect,
    pub center: Point,
}

impl ShapeInstance {
    /// Build an instance, computing derived geometry from the model.
    pub fn new(model: ShapeModel, registry: &ShapeRegistry) -> Result<Self> {
        let kind = registry.get(&model.kind)?;
        let bounds = kind.bounds(&model);
        Ok(Self {
            rotated_bounds: rotated_bounds(bounds, model.rotation),
            center: bounds.center(),
            bounds,
            model,
        })
    }

    /// Recompute derived geometry after the model changed.
    pub fn refresh(&mut self, registry: &ShapeRegistry) -> Result<()> {
        let kind = registry.get(&self.model.kind)?;
        self.bounds = kind.bounds(&self.model);
        self.rotated_bounds = rotated_bounds(self.bounds, self.model.rotation);
        self.center = self.bounds.center();
        Ok(())
    }

    pub fn id(&self) -> &ShapeId {
        &self.model.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let registry = ShapeRegistry::with_defaults();
        for kind in ["box", "dot", "polygon", "line", "draw", "text"] {
            assert!(registry.contains(kind), "missing kind {kind}");
        }
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let mut model = ShapeModel::new(
            "box",
            Point::new(10.0, 20.0),
            ShapeProps::Box { size: [100.0, 50.0] },
        );
        let before = model.clone();
        ShapeUpdate::new(model.id.clone()).merge_into(&mut model);
        assert_eq!(model, before);
    }

    #[test]
    fn test_registry_unknown_kind_errors() {
        let registry = ShapeRegistry::with_defaults();
        assert!(matches!(
            registry.get("blob"),
            Err(CoreError::UnregisteredShapeType(_))
        ));
    }

    #[test]
    fn test_model_roundtrip_json() {
        let model = ShapeModel::new(
            "box",
            Point::new(10.0, 20.0),
            ShapeProps::Box { size: [100.0, 50.0] },
        )
        .with_id("b1");

        let json = serde_json::to_string(&model).unwrap();
        let back: ShapeModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
        assert_eq!(back.kind, "box");
    }

    #[test]
    fn test_props_untagged_disambiguation() {
        let draw = ShapeModel::new(
            "draw",
            Point::ZERO,
            ShapeProps::Draw {
                points: vec![[0.0, 0.0, 0.5]],
                is_complete: false,
            },
        );
        let json = serde_json::to_string(&draw).unwrap();
        let back: ShapeModel = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.props, ShapeProps::Draw { .. }));

        let poly = ShapeModel::new(
            "polygon",
            Point::ZERO,
            ShapeProps::Polygon {
                size: [50.0, 50.0],
                sides: 5,
                ratio: 1.0,
            },
        );
        let json = serde_json::to_string(&poly).unwrap();
        let back: ShapeModel = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.props, ShapeProps::Polygon { .. }));
    }

    #[test]
    fn test_update_merge() {
        let mut model = ShapeModel::new(
            "box",
            Point::ZERO,
            ShapeProps::Box { size: [10.0, 10.0] },
        );
        let update = ShapeUpdate::new(model.id.clone()).point(Point::new(5.0, 6.0));
        update.merge_into(&mut model);
        assert_eq!(model.point, Point::new(5.0, 6.0));
        assert_eq!(model.props, ShapeProps::Box { size: [10.0, 10.0] });
    }

    #[test]
    fn test_instance_caches_rotated_bounds() {
        let registry = ShapeRegistry::with_defaults();
        let mut model = ShapeModel::new(
            "box",
            Point::ZERO,
            ShapeProps::Box { size: [100.0, 50.0] },
        );
        model.rotation = std::f64::consts::FRAC_PI_2;
        let instance = ShapeInstance::new(model, &registry).unwrap();
        assert!((instance.bounds.width() - 100.0).abs() < 1e-9);
        assert!((instance.rotated_bounds.width() - 50.0).abs() < 1e-9);
    }
}
