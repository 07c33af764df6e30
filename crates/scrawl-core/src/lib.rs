//! Scrawl Core Library
//!
//! State-machine-driven whiteboard editor core: document and selection
//! management, shape contracts, transform sessions, and patch-based undo.
//! Rendering and platform integration live in the host application.

pub mod app;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod patch;
pub mod shapes;
pub mod spatial;
pub mod state;
pub mod tools;

pub use app::{App, CursorKind, DisplayState, Document};
pub use camera::{Camera, ZOOM_STEP};
pub use error::{CoreError, Result};
pub use geometry::{BoundsHandle, FlipDirection};
pub use history::{History, HistoryStatus};
pub use input::{EventTarget, InputState, KeyInfo, Modifiers, PinchInfo, PointerInfo, WheelInfo};
pub use shapes::{
    Color, ShapeId, ShapeInstance, ShapeKind, ShapeModel, ShapeProps, ShapeRegistry, ShapeStyle,
    ShapeUpdate, MIN_SIZE,
};
pub use spatial::SpatialIndex;
pub use state::{Event, Passive, StateBehavior, StateNode};
pub use tools::{DEAD_ZONE, HIT_TOLERANCE};
