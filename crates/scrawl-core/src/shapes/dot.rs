//! Dot shape: a fixed-ratio circle.

use super::{ShapeKind, ShapeModel, ShapeProps, MIN_SIZE};
use kurbo::{Point, Rect, Vec2};

/// Behavior for the `dot` kind.
#[derive(Debug)]
pub struct DotKind;

fn radius_of(model: &ShapeModel) -> f64 {
    match model.props {
        ShapeProps::Dot { radius } => radius,
        _ => MIN_SIZE,
    }
}

impl ShapeKind for DotKind {
    fn kind(&self) -> &'static str {
        "dot"
    }

    fn bounds(&self, model: &ShapeModel) -> Rect {
        let r = radius_of(model);
        Rect::new(
            model.point.x,
            model.point.y,
            model.point.x + r * 2.0,
            model.point.y + r * 2.0,
        )
    }

    fn hit_test_point(&self, model: &ShapeModel, point: Point, tolerance: f64) -> bool {
        let r = radius_of(model);
        let center = self.bounds(model).center();
        let dx = point.x - center.x;
        let dy = point.y - center.y;
        let reach = r + tolerance + model.style.stroke_width / 2.0;
        dx * dx + dy * dy <= reach * reach
    }

    fn hit_test_rect(&self, model: &ShapeModel, rect: Rect) -> bool {
        // Circle-rect: clamp the center into the rect and compare distance
        let r = radius_of(model);
        let center = self.bounds(model).center();
        let nearest = Point::new(
            center.x.clamp(rect.x0, rect.x1),
            center.y.clamp(rect.y0, rect.y1),
        );
        let dx = center.x - nearest.x;
        let dy = center.y - nearest.y;
        dx * dx + dy * dy <= r * r
    }

    fn resize(&self, model: &mut ShapeModel, _initial: Rect, new_bounds: Rect, _scale: Vec2) {
        // Dots stay circular; the smaller extent wins
        let radius = (new_bounds.width().min(new_bounds.height()) / 2.0).max(MIN_SIZE / 2.0);
        model.point = Point::new(new_bounds.x0, new_bounds.y0);
        model.props = ShapeProps::Dot { radius };
    }

    fn validate(&self, model: &mut ShapeModel) {
        if let ShapeProps::Dot { radius } = &mut model.props {
            *radius = radius.max(MIN_SIZE / 2.0);
        }
        model.style.clamp();
    }

    fn can_change_aspect_ratio(&self) -> bool {
        false
    }

    fn fixed_aspect_ratio(&self, _model: &ShapeModel) -> Option<f64> {
        Some(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(point: Point, radius: f64) -> ShapeModel {
        ShapeModel::new("dot", point, ShapeProps::Dot { radius })
    }

    #[test]
    fn test_bounds() {
        let model = dot(Point::new(10.0, 10.0), 20.0);
        assert_eq!(DotKind.bounds(&model), Rect::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_hit_test_point() {
        let model = dot(Point::ZERO, 10.0);
        assert!(DotKind.hit_test_point(&model, Point::new(10.0, 10.0), 0.0));
        // Bounding box corner is outside the circle
        assert!(!DotKind.hit_test_point(&model, Point::new(0.5, 0.5), 0.0));
    }

    #[test]
    fn test_hit_test_rect_corner_miss() {
        let model = dot(Point::ZERO, 10.0);
        // Rect overlaps the bounding box corner but not the circle
        assert!(!DotKind.hit_test_rect(&model, Rect::new(-5.0, -5.0, 1.0, 1.0)));
        assert!(DotKind.hit_test_rect(&model, Rect::new(-5.0, -5.0, 10.0, 10.0)));
    }

    #[test]
    fn test_resize_keeps_circle() {
        let mut model = dot(Point::ZERO, 10.0);
        let initial = DotKind.bounds(&model);
        DotKind.resize(&mut model, initial, Rect::new(0.0, 0.0, 60.0, 40.0), Vec2::new(3.0, 2.0));
        assert_eq!(model.props, ShapeProps::Dot { radius: 20.0 });
    }
}
