//! Geometry utilities shared by shapes, tools and the selection system.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Test if two line segments (a-b) and (c-d) intersect.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear cases: check if an endpoint lies on the other segment
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

/// Test if any segment of a polyline intersects or is inside a rectangle.
pub fn polyline_intersects_rect(points: &[Point], rect: Rect) -> bool {
    if points.iter().any(|p| rect.contains(*p)) {
        return true;
    }
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    for w in points.windows(2) {
        for &(c, d) in &edges {
            if segments_intersect(w[0], w[1], c, d) {
                return true;
            }
        }
    }
    false
}

/// Test if a point is inside a polygon using the even-odd ray-cast rule.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    let mut inside = false;
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Rotate a point around a center by an angle in radians.
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Axis-aligned bounding box of a rectangle's corners after rotation
/// around the rectangle's center.
pub fn rotated_bounds(rect: Rect, rotation: f64) -> Rect {
    if rotation == 0.0 {
        return rect;
    }
    let center = rect.center();
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    bounds_from_points(corners.iter().map(|&c| rotate_point(c, center, rotation)))
        .unwrap_or(rect)
}

/// Bounding box of a set of points, or None if empty.
pub fn bounds_from_points(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let mut rect = Rect::new(first.x, first.y, first.x, first.y);
    for p in iter {
        rect.x0 = rect.x0.min(p.x);
        rect.y0 = rect.y0.min(p.y);
        rect.x1 = rect.x1.max(p.x);
        rect.y1 = rect.y1.max(p.y);
    }
    Some(rect)
}

/// Test if `outer` fully contains `inner`.
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Handles on a selection's transform cage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundsHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Right,
    Bottom,
    Left,
    Rotate,
}

impl BoundsHandle {
    /// The handle diagonally or laterally opposite, used as the resize anchor.
    pub fn opposite(self) -> BoundsHandle {
        match self {
            BoundsHandle::TopLeft => BoundsHandle::BottomRight,
            BoundsHandle::TopRight => BoundsHandle::BottomLeft,
            BoundsHandle::BottomLeft => BoundsHandle::TopRight,
            BoundsHandle::BottomRight => BoundsHandle::TopLeft,
            BoundsHandle::Top => BoundsHandle::Bottom,
            BoundsHandle::Bottom => BoundsHandle::Top,
            BoundsHandle::Left => BoundsHandle::Right,
            BoundsHandle::Right => BoundsHandle::Left,
            BoundsHandle::Rotate => BoundsHandle::Rotate,
        }
    }

    /// Whether dragging this handle changes the horizontal extent.
    pub fn affects_x(self) -> bool {
        !matches!(self, BoundsHandle::Top | BoundsHandle::Bottom | BoundsHandle::Rotate)
    }

    /// Whether dragging this handle changes the vertical extent.
    pub fn affects_y(self) -> bool {
        !matches!(self, BoundsHandle::Left | BoundsHandle::Right | BoundsHandle::Rotate)
    }

    /// World position of this handle on a bounding rectangle.
    pub fn position_on(self, rect: Rect) -> Point {
        let c = rect.center();
        match self {
            BoundsHandle::TopLeft => Point::new(rect.x0, rect.y0),
            BoundsHandle::TopRight => Point::new(rect.x1, rect.y0),
            BoundsHandle::BottomLeft => Point::new(rect.x0, rect.y1),
            BoundsHandle::BottomRight => Point::new(rect.x1, rect.y1),
            BoundsHandle::Top => Point::new(c.x, rect.y0),
            BoundsHandle::Bottom => Point::new(c.x, rect.y1),
            BoundsHandle::Left => Point::new(rect.x0, c.y),
            BoundsHandle::Right => Point::new(rect.x1, c.y),
            BoundsHandle::Rotate => Point::new(c.x, rect.y0),
        }
    }
}

/// Transform a bounding box by dragging one of its handles.
///
/// The edges under the dragged handle move by `delta` while the opposite
/// edges stay anchored; a drag past the anchor flips the box, which is
/// normalized back to positive extents. With `aspect` set the result keeps
/// the given width:height ratio, sized by the dominant dragged axis.
pub fn transform_bounds(start: Rect, handle: BoundsHandle, delta: Vec2, aspect: Option<f64>) -> Rect {
    let mut x0 = start.x0;
    let mut y0 = start.y0;
    let mut x1 = start.x1;
    let mut y1 = start.y1;

    match handle {
        BoundsHandle::TopLeft => {
            x0 += delta.x;
            y0 += delta.y;
        }
        BoundsHandle::TopRight => {
            x1 += delta.x;
            y0 += delta.y;
        }
        BoundsHandle::BottomLeft => {
            x0 += delta.x;
            y1 += delta.y;
        }
        BoundsHandle::BottomRight => {
            x1 += delta.x;
            y1 += delta.y;
        }
        BoundsHandle::Top => y0 += delta.y,
        BoundsHandle::Bottom => y1 += delta.y,
        BoundsHandle::Left => x0 += delta.x,
        BoundsHandle::Right => x1 += delta.x,
        BoundsHandle::Rotate => {}
    }

    // Anchor corners for aspect correction before normalization
    let anchored_left = matches!(
        handle,
        BoundsHandle::TopRight | BoundsHandle::BottomRight | BoundsHandle::Right
    );
    let anchored_top = matches!(
        handle,
        BoundsHandle::BottomLeft | BoundsHandle::BottomRight | BoundsHandle::Bottom
    );

    let mut rect = Rect::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1));

    if let Some(ratio) = aspect {
        if ratio > 0.0 {
            let mut width = rect.width();
            let mut height = rect.height();
            if width / ratio >= height {
                height = width / ratio;
            } else {
                width = height * ratio;
            }
            // Grow away from the anchored edges
            let (nx0, nx1) = if anchored_left {
                (rect.x0, rect.x0 + width)
            } else {
                (rect.x1 - width, rect.x1)
            };
            let (ny0, ny1) = if anchored_top {
                (rect.y0, rect.y0 + height)
            } else {
                (rect.y1 - height, rect.y1)
            };
            rect = Rect::new(nx0, ny0, nx1, ny1);
        }
    }

    rect
}

/// Whether dragging a handle by `delta` carries each axis past its anchor.
///
/// `transform_bounds` normalizes the crossed box back to positive extents;
/// callers that mirror content inside the box need the raw crossing flags.
pub fn transform_crossed(start: Rect, handle: BoundsHandle, delta: Vec2) -> (bool, bool) {
    let crossed_x = match handle {
        BoundsHandle::TopLeft | BoundsHandle::BottomLeft | BoundsHandle::Left => {
            start.x0 + delta.x > start.x1
        }
        BoundsHandle::TopRight | BoundsHandle::BottomRight | BoundsHandle::Right => {
            start.x1 + delta.x < start.x0
        }
        _ => false,
    };
    let crossed_y = match handle {
        BoundsHandle::TopLeft | BoundsHandle::TopRight | BoundsHandle::Top => {
            start.y0 + delta.y > start.y1
        }
        BoundsHandle::BottomLeft | BoundsHandle::BottomRight | BoundsHandle::Bottom => {
            start.y1 + delta.y < start.y0
        }
        _ => false,
    };
    (crossed_x, crossed_y)
}

/// Direction for flip operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

/// Reflect a child bounding box across a group box's center axis.
pub fn flip_bounds(child: Rect, group: Rect, direction: FlipDirection) -> Rect {
    match direction {
        FlipDirection::Horizontal => {
            let x0 = group.x0 + (group.x1 - child.x1);
            Rect::new(x0, child.y0, x0 + child.width(), child.y1)
        }
        FlipDirection::Vertical => {
            let y0 = group.y0 + (group.y1 - child.y1);
            Rect::new(child.x0, y0, child.x1, y0 + child.height())
        }
    }
}

/// Reduce a polyline with the Douglas-Peucker algorithm.
///
/// Points further than `tolerance` from the chord between kept neighbors
/// survive; everything else is dropped. Endpoints are always kept.
pub fn simplify_polyline(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    simplify_segment(points, 0, points.len() - 1, tolerance, &mut keep);
    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn simplify_segment(points: &[Point], first: usize, last: usize, tolerance: f64, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }
    let mut max_dist = 0.0;
    let mut index = first;
    for i in (first + 1)..last {
        let dist = point_to_segment_dist(points[i], points[first], points[last]);
        if dist > max_dist {
            max_dist = dist;
            index = i;
        }
    }
    if max_dist > tolerance {
        keep[index] = true;
        simplify_segment(points, first, index, tolerance, keep);
        simplify_segment(points, index, last, tolerance, keep);
    }
}

/// Snap an angle (radians) to the nearest multiple of `increment`.
pub fn snap_angle(angle: f64, increment: f64) -> f64 {
    (angle / increment).round() * increment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 5.0), a, b) - 5.0).abs() < f64::EPSILON);
        assert!((point_to_segment_dist(Point::new(-5.0, 0.0), a, b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_segments_intersect() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ));
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(5.0, 5.0),
            Point::new(6.0, 5.0),
        ));
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
    }

    #[test]
    fn test_rotated_bounds_quarter_turn() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let rotated = rotated_bounds(rect, std::f64::consts::FRAC_PI_2);
        // A 90° turn swaps width and height around the same center
        assert!((rotated.width() - 50.0).abs() < 1e-9);
        assert!((rotated.height() - 100.0).abs() < 1e-9);
        assert!((rotated.center().x - 50.0).abs() < 1e-9);
        assert!((rotated.center().y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_bounds_bottom_right() {
        let start = Rect::new(0.0, 0.0, 100.0, 100.0);
        let result = transform_bounds(start, BoundsHandle::BottomRight, Vec2::new(50.0, 20.0), None);
        assert!((result.width() - 150.0).abs() < f64::EPSILON);
        assert!((result.height() - 120.0).abs() < f64::EPSILON);
        assert!((result.x0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transform_bounds_crossing_normalizes() {
        let start = Rect::new(0.0, 0.0, 100.0, 100.0);
        let result =
            transform_bounds(start, BoundsHandle::BottomRight, Vec2::new(-150.0, -150.0), None);
        assert!(result.width() >= 0.0 && result.height() >= 0.0);
        assert!((result.x0 - -50.0).abs() < f64::EPSILON);
        assert!((result.x1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transform_crossed() {
        let start = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            transform_crossed(start, BoundsHandle::BottomRight, Vec2::new(-150.0, 50.0)),
            (true, false)
        );
        assert_eq!(
            transform_crossed(start, BoundsHandle::TopLeft, Vec2::new(50.0, 150.0)),
            (false, true)
        );
        assert_eq!(
            transform_crossed(start, BoundsHandle::Right, Vec2::new(50.0, 0.0)),
            (false, false)
        );
    }

    #[test]
    fn test_transform_bounds_aspect_locked() {
        let start = Rect::new(0.0, 0.0, 100.0, 50.0);
        let result =
            transform_bounds(start, BoundsHandle::BottomRight, Vec2::new(100.0, 0.0), Some(2.0));
        assert!((result.width() / result.height() - 2.0).abs() < 1e-9);
        // Anchored at the top-left
        assert!((result.x0).abs() < f64::EPSILON);
        assert!((result.y0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_flip_bounds_horizontal() {
        let group = Rect::new(0.0, 0.0, 300.0, 100.0);
        let child = Rect::new(0.0, 0.0, 100.0, 100.0);
        let flipped = flip_bounds(child, group, FlipDirection::Horizontal);
        assert!((flipped.x0 - 200.0).abs() < f64::EPSILON);
        assert!((flipped.x1 - 300.0).abs() < f64::EPSILON);
        assert!((flipped.y0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_simplify_polyline_collinear() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.01),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.02),
            Point::new(4.0, 0.0),
        ];
        let simplified = simplify_polyline(&points, 0.5);
        assert_eq!(simplified.len(), 2);
        assert_eq!(simplified[0], points[0]);
        assert_eq!(simplified[1], points[4]);
    }

    #[test]
    fn test_simplify_polyline_keeps_corners() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 50.0),
        ];
        let simplified = simplify_polyline(&points, 1.0);
        assert_eq!(simplified.len(), 3);
    }

    #[test]
    fn test_rect_contains_rect() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(rect_contains_rect(outer, Rect::new(10.0, 10.0, 90.0, 90.0)));
        assert!(!rect_contains_rect(outer, Rect::new(10.0, 10.0, 110.0, 90.0)));
    }
}
