//! Axis-aligned box shape.

use super::{to_local, ShapeKind, ShapeModel, ShapeProps, MIN_SIZE};
use crate::geometry::{point_in_polygon, polyline_intersects_rect, rotate_point};
use kurbo::{Point, Rect, Vec2};

/// Behavior for the `box` kind.
#[derive(Debug)]
pub struct BoxKind;

fn size_of(model: &ShapeModel) -> [f64; 2] {
    match &model.props {
        ShapeProps::Box { size } => *size,
        _ => [MIN_SIZE, MIN_SIZE],
    }
}

/// The box corners after rotation, as a closed loop.
fn rotated_corners(model: &ShapeModel, bounds: Rect) -> Vec<Point> {
    let center = bounds.center();
    let corners = [
        Point::new(bounds.x0, bounds.y0),
        Point::new(bounds.x1, bounds.y0),
        Point::new(bounds.x1, bounds.y1),
        Point::new(bounds.x0, bounds.y1),
    ];
    let mut loop_pts: Vec<Point> = corners
        .iter()
        .map(|&c| rotate_point(c, center, model.rotation))
        .collect();
    loop_pts.push(loop_pts[0]);
    loop_pts
}

impl ShapeKind for BoxKind {
    fn kind(&self) -> &'static str {
        "box"
    }

    fn bounds(&self, model: &ShapeModel) -> Rect {
        let [w, h] = size_of(model);
        Rect::new(model.point.x, model.point.y, model.point.x + w, model.point.y + h)
    }

    fn hit_test_point(&self, model: &ShapeModel, point: Point, tolerance: f64) -> bool {
        let bounds = self.bounds(model);
        let local = to_local(point, bounds, model.rotation);
        if model.style.fill_color.is_some() {
            bounds.inflate(tolerance, tolerance).contains(local)
        } else {
            // Outline only: hit on the border band
            let band = tolerance + model.style.stroke_width / 2.0;
            let outer = bounds.inflate(band, band);
            let inner = bounds.inflate(-band, -band);
            outer.contains(local) && !inner.contains(local)
        }
    }

    fn hit_test_rect(&self, model: &ShapeModel, rect: Rect) -> bool {
        let bounds = self.bounds(model);
        let corners = rotated_corners(model, bounds);
        polyline_intersects_rect(&corners, rect)
            || point_in_polygon(rect.center(), &corners[..corners.len() - 1])
    }

    fn resize(&self, model: &mut ShapeModel, _initial: Rect, new_bounds: Rect, _scale: Vec2) {
        model.point = Point::new(new_bounds.x0, new_bounds.y0);
        model.props = ShapeProps::Box {
            size: [new_bounds.width(), new_bounds.height()],
        };
    }

    fn validate(&self, model: &mut ShapeModel) {
        if let ShapeProps::Box { size } = &mut model.props {
            size[0] = size[0].max(MIN_SIZE);
            size[1] = size[1].max(MIN_SIZE);
        }
        model.style.clamp();
    }
}
