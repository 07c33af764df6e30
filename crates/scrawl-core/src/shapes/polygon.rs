//! Regular polygon and star shape.

use super::{to_local, ShapeKind, ShapeModel, ShapeProps, MIN_SIZE};
use crate::geometry::{point_in_polygon, point_to_polyline_dist, polyline_intersects_rect, rotate_point};
use kurbo::{Point, Rect, Vec2};

/// Behavior for the `polygon` kind.
///
/// `sides` vertices are placed on an ellipse inscribed in the size box;
/// a `ratio` below 1.0 interleaves inner vertices, producing a star.
#[derive(Debug)]
pub struct PolygonKind;

fn props_of(model: &ShapeModel) -> ([f64; 2], u32, f64) {
    match model.props {
        ShapeProps::Polygon { size, sides, ratio } => (size, sides, ratio),
        _ => ([MIN_SIZE, MIN_SIZE], 3, 1.0),
    }
}

/// Vertices in page space, unrotated.
pub fn vertices(model: &ShapeModel) -> Vec<Point> {
    let ([w, h], sides, ratio) = props_of(model);
    let cx = model.point.x + w / 2.0;
    let cy = model.point.y + h / 2.0;
    let rx = w / 2.0;
    let ry = h / 2.0;
    let star = ratio < 1.0;
    let count = if star { sides * 2 } else { sides };
    (0..count)
        .map(|i| {
            let theta = -std::f64::consts::FRAC_PI_2
                + i as f64 * std::f64::consts::TAU / count as f64;
            let scale = if star && i % 2 == 1 { ratio } else { 1.0 };
            Point::new(
                cx + rx * scale * theta.cos(),
                cy + ry * scale * theta.sin(),
            )
        })
        .collect()
}

fn closed_loop(model: &ShapeModel) -> Vec<Point> {
    let bounds = PolygonKind.bounds(model);
    let center = bounds.center();
    let mut pts: Vec<Point> = vertices(model)
        .into_iter()
        .map(|p| rotate_point(p, center, model.rotation))
        .collect();
    if let Some(&first) = pts.first() {
        pts.push(first);
    }
    pts
}

impl ShapeKind for PolygonKind {
    fn kind(&self) -> &'static str {
        "polygon"
    }

    fn bounds(&self, model: &ShapeModel) -> Rect {
        let ([w, h], _, _) = props_of(model);
        Rect::new(model.point.x, model.point.y, model.point.x + w, model.point.y + h)
    }

    fn hit_test_point(&self, model: &ShapeModel, point: Point, tolerance: f64) -> bool {
        let bounds = self.bounds(model);
        let local = to_local(point, bounds, model.rotation);
        let verts = vertices(model);
        if model.style.fill_color.is_some() && point_in_polygon(local, &verts) {
            return true;
        }
        let mut loop_pts = verts;
        if let Some(&first) = loop_pts.first() {
            loop_pts.push(first);
        }
        point_to_polyline_dist(local, &loop_pts) <= tolerance + model.style.stroke_width / 2.0
    }

    fn hit_test_rect(&self, model: &ShapeModel, rect: Rect) -> bool {
        let loop_pts = closed_loop(model);
        polyline_intersects_rect(&loop_pts, rect)
            || point_in_polygon(rect.center(), &loop_pts[..loop_pts.len() - 1])
    }

    fn resize(&self, model: &mut ShapeModel, _initial: Rect, new_bounds: Rect, _scale: Vec2) {
        let (_, sides, ratio) = props_of(model);
        model.point = Point::new(new_bounds.x0, new_bounds.y0);
        model.props = ShapeProps::Polygon {
            size: [new_bounds.width(), new_bounds.height()],
            sides,
            ratio,
        };
    }

    fn validate(&self, model: &mut ShapeModel) {
        if let ShapeProps::Polygon { size, sides, ratio } = &mut model.props {
            size[0] = size[0].max(MIN_SIZE);
            size[1] = size[1].max(MIN_SIZE);
            *sides = (*sides).max(3);
            *ratio = ratio.clamp(f64::EPSILON, 1.0);
        }
        model.style.clamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Color;

    fn polygon(sides: u32, ratio: f64) -> ShapeModel {
        ShapeModel::new(
            "polygon",
            Point::ZERO,
            ShapeProps::Polygon {
                size: [100.0, 100.0],
                sides,
                ratio,
            },
        )
    }

    #[test]
    fn test_vertex_counts() {
        assert_eq!(vertices(&polygon(5, 1.0)).len(), 5);
        // Stars interleave inner vertices
        assert_eq!(vertices(&polygon(5, 0.5)).len(), 10);
    }

    #[test]
    fn test_first_vertex_at_top() {
        let verts = vertices(&polygon(4, 1.0));
        assert!((verts[0].x - 50.0).abs() < 1e-9);
        assert!((verts[0].y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_filled_hit_center() {
        let mut model = polygon(6, 1.0);
        model.style.fill_color = Some(Color::black());
        assert!(PolygonKind.hit_test_point(&model, Point::new(50.0, 50.0), 0.0));
    }

    #[test]
    fn test_unfilled_misses_center() {
        let model = polygon(6, 1.0);
        assert!(!PolygonKind.hit_test_point(&model, Point::new(50.0, 50.0), 2.0));
        // But hits the outline near the top vertex
        assert!(PolygonKind.hit_test_point(&model, Point::new(50.0, 1.0), 2.0));
    }

    #[test]
    fn test_star_corner_miss() {
        let mut model = polygon(4, 0.3);
        model.style.fill_color = Some(Color::black());
        // Bounding box corner is outside the star's arms
        assert!(!PolygonKind.hit_test_point(&model, Point::new(5.0, 5.0), 0.0));
    }

    #[test]
    fn test_validate_clamps() {
        let mut model = ShapeModel::new(
            "polygon",
            Point::ZERO,
            ShapeProps::Polygon {
                size: [0.0, -10.0],
                sides: 2,
                ratio: 4.0,
            },
        );
        PolygonKind.validate(&mut model);
        if let ShapeProps::Polygon { size, sides, ratio } = model.props {
            assert_eq!(size, [MIN_SIZE, MIN_SIZE]);
            assert_eq!(sides, 3);
            assert!((ratio - 1.0).abs() < f64::EPSILON);
        } else {
            panic!("expected polygon props");
        }
    }
}
