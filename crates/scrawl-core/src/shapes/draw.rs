//! Freehand draw shape: a pressure-tagged point trail.

use super::{ShapeKind, ShapeModel, ShapeProps, MIN_SIZE};
use crate::geometry::{bounds_from_points, point_to_polyline_dist, polyline_intersects_rect};
use kurbo::{Point, Rect, Vec2};

/// Behavior for the `draw` kind.
///
/// Points are `[x, y, pressure]` relative to the shape origin; the trail is
/// re-normalized so the origin stays at the top-left of the point bounds.
#[derive(Debug)]
pub struct DrawKind;

fn points_of(model: &ShapeModel) -> &[[f64; 3]] {
    match &model.props {
        ShapeProps::Draw { points, .. } => points,
        _ => &[],
    }
}

fn is_complete(model: &ShapeModel) -> bool {
    match &model.props {
        ShapeProps::Draw { is_complete, .. } => *is_complete,
        _ => false,
    }
}

/// Trail positions in page space, pressure dropped.
pub fn page_points(model: &ShapeModel) -> Vec<Point> {
    points_of(model)
        .iter()
        .map(|[x, y, _]| Point::new(model.point.x + x, model.point.y + y))
        .collect()
}

/// Rewrite point + trail so the relative points' bounds start at zero.
fn normalize(model: &mut ShapeModel, page: Vec<[f64; 3]>) {
    let Some(bounds) = bounds_from_points(page.iter().map(|[x, y, _]| Point::new(*x, *y))) else {
        return;
    };
    let complete = is_complete(model);
    model.point = Point::new(bounds.x0, bounds.y0);
    model.props = ShapeProps::Draw {
        points: page
            .into_iter()
            .map(|[x, y, p]| [x - bounds.x0, y - bounds.y0, p])
            .collect(),
        is_complete: complete,
    };
}

/// Append page-space samples to an existing stroke, re-offsetting the trail.
pub fn extend_stroke(model: &mut ShapeModel, samples: &[[f64; 3]]) {
    let origin = model.point;
    let mut page: Vec<[f64; 3]> = points_of(model)
        .iter()
        .map(|[x, y, p]| [origin.x + x, origin.y + y, *p])
        .collect();
    page.extend_from_slice(samples);
    normalize(model, page);
}

impl ShapeKind for DrawKind {
    fn kind(&self) -> &'static str {
        "draw"
    }

    fn bounds(&self, model: &ShapeModel) -> Rect {
        bounds_from_points(page_points(model))
            .unwrap_or(Rect::new(model.point.x, model.point.y, model.point.x, model.point.y))
    }

    fn hit_test_point(&self, model: &ShapeModel, point: Point, tolerance: f64) -> bool {
        let pts = page_points(model);
        match pts.len() {
            0 => false,
            // A tap leaves a single point; hit-test it as a dot
            1 => (point - pts[0]).hypot() <= tolerance + model.style.stroke_width / 2.0,
            _ => point_to_polyline_dist(point, &pts) <= tolerance + model.style.stroke_width / 2.0,
        }
    }

    fn hit_test_rect(&self, model: &ShapeModel, rect: Rect) -> bool {
        let pts = page_points(model);
        if pts.len() == 1 {
            return rect.contains(pts[0]);
        }
        polyline_intersects_rect(&pts, rect)
    }

    fn resize(&self, model: &mut ShapeModel, initial: Rect, new_bounds: Rect, scale: Vec2) {
        let w = initial.width().max(MIN_SIZE);
        let h = initial.height().max(MIN_SIZE);
        let origin = model.point;
        let page: Vec<[f64; 3]> = points_of(model)
            .iter()
            .map(|[x, y, p]| {
                let mut rx = (origin.x + x - initial.x0) / w;
                let mut ry = (origin.y + y - initial.y0) / h;
                if scale.x < 0.0 {
                    rx = 1.0 - rx;
                }
                if scale.y < 0.0 {
                    ry = 1.0 - ry;
                }
                [
                    new_bounds.x0 + rx * new_bounds.width(),
                    new_bounds.y0 + ry * new_bounds.height(),
                    *p,
                ]
            })
            .collect();
        normalize(model, page);
    }

    fn validate(&self, model: &mut ShapeModel) {
        if let ShapeProps::Draw { points, .. } = &mut model.props {
            if points.is_empty() {
                points.push([0.0, 0.0, 0.5]);
            }
            for point in points.iter_mut() {
                point[2] = point[2].clamp(0.0, 1.0);
            }
        }
        model.style.clamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(start: Point, points: Vec<[f64; 3]>) -> ShapeModel {
        ShapeModel::new(
            "draw",
            start,
            ShapeProps::Draw {
                points,
                is_complete: true,
            },
        )
    }

    #[test]
    fn test_bounds() {
        let model = stroke(
            Point::new(5.0, 5.0),
            vec![[0.0, 0.0, 0.5], [20.0, 10.0, 0.5], [40.0, 0.0, 0.5]],
        );
        assert_eq!(DrawKind.bounds(&model), Rect::new(5.0, 5.0, 45.0, 15.0));
    }

    #[test]
    fn test_single_point_hit() {
        let model = stroke(Point::new(10.0, 10.0), vec![[0.0, 0.0, 0.5]]);
        assert!(DrawKind.hit_test_point(&model, Point::new(10.5, 10.0), 1.0));
        assert!(!DrawKind.hit_test_point(&model, Point::new(20.0, 10.0), 1.0));
    }

    #[test]
    fn test_trail_hit() {
        let model = stroke(Point::ZERO, vec![[0.0, 0.0, 0.5], [100.0, 0.0, 0.5]]);
        assert!(DrawKind.hit_test_point(&model, Point::new(50.0, 1.0), 2.0));
        assert!(!DrawKind.hit_test_point(&model, Point::new(50.0, 20.0), 2.0));
    }

    #[test]
    fn test_resize_preserves_pressure() {
        let mut model = stroke(Point::ZERO, vec![[0.0, 0.0, 0.2], [100.0, 50.0, 0.9]]);
        let initial = DrawKind.bounds(&model);
        DrawKind.resize(&mut model, initial, Rect::new(0.0, 0.0, 50.0, 25.0), Vec2::new(0.5, 0.5));
        if let ShapeProps::Draw { points, is_complete } = &model.props {
            assert!(is_complete);
            assert_eq!(points[1], [50.0, 25.0, 0.9]);
            assert_eq!(points[0][2], 0.2);
        } else {
            panic!("expected draw props");
        }
    }

    #[test]
    fn test_resize_mirrors_on_negative_scale() {
        let mut model = stroke(Point::ZERO, vec![[0.0, 0.0, 0.5], [100.0, 40.0, 0.5]]);
        let initial = DrawKind.bounds(&model);
        DrawKind.resize(&mut model, initial, Rect::new(0.0, 0.0, 100.0, 40.0), Vec2::new(-1.0, 1.0));
        if let ShapeProps::Draw { points, .. } = &model.props {
            assert_eq!(points[0], [100.0, 0.0, 0.5]);
            assert_eq!(points[1], [0.0, 40.0, 0.5]);
        } else {
            panic!("expected draw props");
        }
    }

    #[test]
    fn test_extend_stroke_reoffsets() {
        let mut model = stroke(Point::new(10.0, 10.0), vec![[0.0, 0.0, 0.5], [10.0, 0.0, 0.5]]);
        extend_stroke(&mut model, &[[0.0, 5.0, 0.5]]);
        // New sample to the left pulls the origin over
        assert_eq!(model.point, Point::new(0.0, 5.0));
        if let ShapeProps::Draw { points, .. } = &model.props {
            assert_eq!(points[0], [10.0, 5.0, 0.5]);
            assert_eq!(points[2], [0.0, 0.0, 0.5]);
        } else {
            panic!("expected draw props");
        }
    }

    #[test]
    fn test_validate_clamps_pressure() {
        let mut model = stroke(Point::ZERO, vec![[0.0, 0.0, 3.0], [1.0, 1.0, -1.0]]);
        DrawKind.validate(&mut model);
        if let ShapeProps::Draw { points, .. } = &model.props {
            assert_eq!(points[0][2], 1.0);
            assert_eq!(points[1][2], 0.0);
        } else {
            panic!("expected draw props");
        }
    }
}
