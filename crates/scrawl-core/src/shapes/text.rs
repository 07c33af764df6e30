//! Text shape: an editable block with externally measured size.

use super::{to_local, ShapeKind, ShapeModel, ShapeProps, MIN_SIZE};
use crate::geometry::{point_in_polygon, polyline_intersects_rect, rotate_point};
use kurbo::{Point, Rect, Vec2};

/// Behavior for the `text` kind.
///
/// The host measures rendered text and writes the size back into the props;
/// resize sessions may reposition the block but never change its dimensions.
#[derive(Debug)]
pub struct TextKind;

fn size_of(model: &ShapeModel) -> [f64; 2] {
    match &model.props {
        ShapeProps::Text { size, .. } => *size,
        _ => [MIN_SIZE, MIN_SIZE],
    }
}

impl ShapeKind for TextKind {
    fn kind(&self) -> &'static str {
        "text"
    }

    fn bounds(&self, model: &ShapeModel) -> Rect {
        let [w, h] = size_of(model);
        Rect::new(model.point.x, model.point.y, model.point.x + w, model.point.y + h)
    }

    fn hit_test_point(&self, model: &ShapeModel, point: Point, tolerance: f64) -> bool {
        let bounds = self.bounds(model);
        let local = to_local(point, bounds, model.rotation);
        bounds.inflate(tolerance, tolerance).contains(local)
    }

    fn hit_test_rect(&self, model: &ShapeModel, rect: Rect) -> bool {
        let bounds = self.bounds(model);
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
        polyline_intersects_rect(&loop_pts, rect)
            || point_in_polygon(rect.center(), &loop_pts[..4])
    }

    fn resize(&self, model: &mut ShapeModel, _initial: Rect, new_bounds: Rect, _scale: Vec2) {
        // Dimensions come from text measurement; only the origin moves
        model.point = Point::new(new_bounds.x0, new_bounds.y0);
    }

    fn validate(&self, model: &mut ShapeModel) {
        if let ShapeProps::Text { size, .. } = &mut model.props {
            size[0] = size[0].max(MIN_SIZE);
            size[1] = size[1].max(MIN_SIZE);
        }
        model.style.clamp();
    }

    fn can_resize(&self) -> bool {
        false
    }

    fn can_change_aspect_ratio(&self) -> bool {
        false
    }

    fn can_edit(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> ShapeModel {
        ShapeModel::new(
            "text",
            Point::new(10.0, 10.0),
            ShapeProps::Text {
                text: content.to_string(),
                size: [80.0, 20.0],
            },
        )
    }

    #[test]
    fn test_hit_test_whole_block() {
        let model = text("hello");
        // Text hits anywhere in its bounds, filled or not
        assert!(TextKind.hit_test_point(&model, Point::new(50.0, 20.0), 0.0));
        assert!(!TextKind.hit_test_point(&model, Point::new(50.0, 40.0), 0.0));
    }

    #[test]
    fn test_resize_repositions_only() {
        let mut model = text("hello");
        let initial = TextKind.bounds(&model);
        TextKind.resize(&mut model, initial, Rect::new(0.0, 0.0, 40.0, 10.0), Vec2::new(0.5, 0.5));
        assert_eq!(model.point, Point::ZERO);
        assert_eq!(
            model.props,
            ShapeProps::Text {
                text: "hello".to_string(),
                size: [80.0, 20.0],
            }
        );
    }

    #[test]
    fn test_capabilities() {
        assert!(!TextKind.can_resize());
        assert!(!TextKind.can_change_aspect_ratio());
        assert!(TextKind.can_edit());
    }
}
