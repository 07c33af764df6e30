//! Host-facing event types and pointer bookkeeping.
//!
//! The host classifies what the pointer is over (`EventTarget`) and feeds
//! screen-space events in; `InputState` keeps the origin/previous/current
//! positions in both spaces so sessions can read drag deltas without
//! re-deriving them from the camera.

use crate::geometry::BoundsHandle;
use crate::shapes::ShapeId;
use kurbo::{Point, Vec2};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// The platform selection modifier (cmd on mac, ctrl elsewhere).
    pub fn platform(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What the host determined the pointer is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTarget {
    /// Empty canvas.
    Canvas,
    /// A shape's geometry.
    Shape(ShapeId),
    /// A handle on the selection bounds (resize corner/edge or rotate).
    SelectionHandle(BoundsHandle),
    /// An editable handle on a specific shape (line/draw endpoints).
    ShapeHandle(ShapeId, usize),
}

/// One pointer event as delivered by the host, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerInfo {
    pub point: Point,
    pub target: EventTarget,
    pub modifiers: Modifiers,
    /// Stylus pressure if the device reports it.
    pub pressure: Option<f64>,
}

impl PointerInfo {
    pub fn new(point: Point, target: EventTarget) -> Self {
        Self {
            point,
            target,
            modifiers: Modifiers::default(),
            pressure: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// One keyboard event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyInfo {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
        }
    }
}

/// Scroll wheel event in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInfo {
    pub point: Point,
    pub delta: Vec2,
    pub modifiers: Modifiers,
}

/// Two-finger pinch event in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchInfo {
    pub center: Point,
    /// Incremental zoom factor for this event (1.0 = no change).
    pub scale: f64,
    pub delta: Vec2,
}

/// Pointer bookkeeping shared by every session.
///
/// Page-space points are written by the app after camera conversion; states
/// read them instead of converting screen points themselves.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Where the current interaction started.
    pub origin_screen: Point,
    pub origin_page: Point,
    /// Position at the previous event.
    pub previous_screen: Point,
    pub previous_page: Point,
    /// Position now.
    pub current_screen: Point,
    pub current_page: Point,
    /// Modifier flags from the most recent event.
    pub modifiers: Modifiers,
    /// Target recorded at pointer-down.
    pub pointer_down_target: Option<EventTarget>,
    /// Whether a button is held.
    pub is_pointer_down: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer-down, resetting the interaction origin.
    pub fn on_pointer_down(&mut self, screen: Point, page: Point, info: &PointerInfo) {
        self.origin_screen = screen;
        self.origin_page = page;
        self.previous_screen = screen;
        self.previous_page = page;
        self.current_screen = screen;
        self.current_page = page;
        self.modifiers = info.modifiers;
        self.pointer_down_target = Some(info.target.clone());
        self.is_pointer_down = true;
    }

    /// Record a pointer-move.
    pub fn on_pointer_move(&mut self, screen: Point, page: Point, modifiers: Modifiers) {
        self.previous_screen = self.current_screen;
        self.previous_page = self.current_page;
        self.current_screen = screen;
        self.current_page = page;
        self.modifiers = modifiers;
    }

    /// Close out the interaction after the release event has been handled.
    pub fn end_interaction(&mut self) {
        self.is_pointer_down = false;
        self.pointer_down_target = None;
    }

    /// Total page-space movement since the interaction origin.
    pub fn page_delta(&self) -> Vec2 {
        self.current_page - self.origin_page
    }

    /// Page-space movement since the previous event.
    pub fn page_step(&self) -> Vec2 {
        self.current_page - self.previous_page
    }

    /// Straight-line page-space distance from the interaction origin.
    pub fn drag_distance(&self) -> f64 {
        self.page_delta().hypot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_tracking() {
        let mut inputs = InputState::new();
        let info = PointerInfo::new(Point::new(10.0, 10.0), EventTarget::Canvas);
        inputs.on_pointer_down(Point::new(10.0, 10.0), Point::new(20.0, 20.0), &info);
        inputs.on_pointer_move(Point::new(13.0, 14.0), Point::new(26.0, 28.0), Modifiers::default());

        assert_eq!(inputs.page_delta(), Vec2::new(6.0, 8.0));
        assert_eq!(inputs.page_step(), Vec2::new(6.0, 8.0));
        assert!((inputs.drag_distance() - 10.0).abs() < 1e-9);

        inputs.on_pointer_move(Point::new(14.0, 14.0), Point::new(28.0, 28.0), Modifiers::default());
        assert_eq!(inputs.page_step(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_end_interaction_clears_target() {
        let mut inputs = InputState::new();
        let info = PointerInfo::new(Point::ZERO, EventTarget::Shape(ShapeId::from("b1")));
        inputs.on_pointer_down(Point::ZERO, Point::ZERO, &info);
        assert!(inputs.is_pointer_down);
        assert_eq!(
            inputs.pointer_down_target,
            Some(EventTarget::Shape(ShapeId::from("b1")))
        );

        // The target survives the release event and clears afterwards
        inputs.on_pointer_move(Point::ZERO, Point::ZERO, Modifiers::default());
        assert_eq!(
            inputs.pointer_down_target,
            Some(EventTarget::Shape(ShapeId::from("b1")))
        );
        inputs.end_interaction();
        assert!(!inputs.is_pointer_down);
        assert!(inputs.pointer_down_target.is_none());
    }
}
