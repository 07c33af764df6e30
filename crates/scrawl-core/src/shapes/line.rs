//! Line shape: a polyline through editable handles.

use super::{ShapeKind, ShapeModel, ShapeProps, MIN_SIZE};
use crate::geometry::{bounds_from_points, point_to_polyline_dist, polyline_intersects_rect};
use kurbo::{Point, Rect, Vec2};

/// Behavior for the `line` kind.
///
/// Handles are stored relative to the shape origin; the first handle is
/// kept at the bounds origin by re-normalizing after every edit.
#[derive(Debug)]
pub struct LineKind;

fn handles_of(model: &ShapeModel) -> &[[f64; 2]] {
    match &model.props {
        ShapeProps::Line { handles } => handles,
        _ => &[],
    }
}

/// Handle positions in page space.
pub fn page_points(model: &ShapeModel) -> Vec<Point> {
    handles_of(model)
        .iter()
        .map(|[x, y]| Point::new(model.point.x + x, model.point.y + y))
        .collect()
}

/// Rewrite point + handles so the relative points' bounds start at zero.
fn normalize(model: &mut ShapeModel, page: Vec<Point>) {
    let Some(bounds) = bounds_from_points(page.iter().copied()) else {
        return;
    };
    model.point = Point::new(bounds.x0, bounds.y0);
    model.props = ShapeProps::Line {
        handles: page
            .into_iter()
            .map(|p| [p.x - bounds.x0, p.y - bounds.y0])
            .collect(),
    };
}

impl ShapeKind for LineKind {
    fn kind(&self) -> &'static str {
        "line"
    }

    fn bounds(&self, model: &ShapeModel) -> Rect {
        bounds_from_points(page_points(model))
            .unwrap_or(Rect::new(model.point.x, model.point.y, model.point.x, model.point.y))
    }

    fn hit_test_point(&self, model: &ShapeModel, point: Point, tolerance: f64) -> bool {
        let pts = page_points(model);
        if pts.len() < 2 {
            return false;
        }
        point_to_polyline_dist(point, &pts) <= tolerance + model.style.stroke_width / 2.0
    }

    fn hit_test_rect(&self, model: &ShapeModel, rect: Rect) -> bool {
        polyline_intersects_rect(&page_points(model), rect)
    }

    fn resize(&self, model: &mut ShapeModel, initial: Rect, new_bounds: Rect, scale: Vec2) {
        let w = initial.width().max(MIN_SIZE);
        let h = initial.height().max(MIN_SIZE);
        let page: Vec<Point> = page_points(model)
            .into_iter()
            .map(|p| {
                let mut rx = (p.x - initial.x0) / w;
                let mut ry = (p.y - initial.y0) / h;
                if scale.x < 0.0 {
                    rx = 1.0 - rx;
                }
                if scale.y < 0.0 {
                    ry = 1.0 - ry;
                }
                Point::new(
                    new_bounds.x0 + rx * new_bounds.width(),
                    new_bounds.y0 + ry * new_bounds.height(),
                )
            })
            .collect();
        normalize(model, page);
    }

    fn on_handle_change(&self, model: &mut ShapeModel, index: usize, point: Point) {
        let mut page = page_points(model);
        if let Some(slot) = page.get_mut(index) {
            *slot = point;
            normalize(model, page);
        }
    }

    fn handles(&self, model: &ShapeModel) -> Vec<Point> {
        page_points(model)
    }

    fn validate(&self, model: &mut ShapeModel) {
        if let ShapeProps::Line { handles } = &mut model.props {
            match handles.len() {
                0 => *handles = vec![[0.0, 0.0], [0.0, 0.0]],
                1 => handles.push(handles[0]),
                _ => {}
            }
        }
        model.style.clamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(start: Point, handles: Vec<[f64; 2]>) -> ShapeModel {
        ShapeModel::new("line", start, ShapeProps::Line { handles })
    }

    #[test]
    fn test_bounds() {
        let model = line(Point::new(10.0, 10.0), vec![[0.0, 0.0], [100.0, 50.0]]);
        assert_eq!(LineKind.bounds(&model), Rect::new(10.0, 10.0, 110.0, 60.0));
    }

    #[test]
    fn test_hit_test_on_segment() {
        let model = line(Point::ZERO, vec![[0.0, 0.0], [100.0, 100.0]]);
        assert!(LineKind.hit_test_point(&model, Point::new(50.0, 50.0), 2.0));
        assert!(!LineKind.hit_test_point(&model, Point::new(50.0, 0.0), 2.0));
    }

    #[test]
    fn test_hit_test_rect_crossing() {
        let model = line(Point::ZERO, vec![[0.0, 0.0], [100.0, 100.0]]);
        // The segment crosses this rect without either endpoint inside
        assert!(LineKind.hit_test_rect(&model, Rect::new(40.0, 0.0, 60.0, 100.0)));
        assert!(!LineKind.hit_test_rect(&model, Rect::new(80.0, 0.0, 100.0, 20.0)));
    }

    #[test]
    fn test_handle_change_renormalizes() {
        let mut model = line(Point::ZERO, vec![[0.0, 0.0], [100.0, 100.0]]);
        LineKind.on_handle_change(&mut model, 0, Point::new(-50.0, 20.0));
        // Origin follows the new bounds
        assert_eq!(model.point, Point::new(-50.0, 20.0));
        if let ShapeProps::Line { handles } = &model.props {
            assert_eq!(handles[0], [0.0, 0.0]);
            assert_eq!(handles[1], [150.0, 80.0]);
        } else {
            panic!("expected line props");
        }
    }

    #[test]
    fn test_resize_scales_handles() {
        let mut model = line(Point::ZERO, vec![[0.0, 0.0], [100.0, 100.0]]);
        let initial = LineKind.bounds(&model);
        LineKind.resize(&mut model, initial, Rect::new(0.0, 0.0, 50.0, 200.0), Vec2::new(0.5, 2.0));
        if let ShapeProps::Line { handles } = &model.props {
            assert_eq!(handles[1], [50.0, 200.0]);
        } else {
            panic!("expected line props");
        }
    }

    #[test]
    fn test_resize_negative_scale_mirrors() {
        let mut model = line(Point::ZERO, vec![[0.0, 0.0], [100.0, 50.0]]);
        let initial = LineKind.bounds(&model);
        LineKind.resize(&mut model, initial, Rect::new(0.0, 0.0, 100.0, 50.0), Vec2::new(-1.0, 1.0));
        if let ShapeProps::Line { handles } = &model.props {
            assert_eq!(handles[0], [100.0, 0.0]);
            assert_eq!(handles[1], [0.0, 50.0]);
        } else {
            panic!("expected line props");
        }
    }
}
