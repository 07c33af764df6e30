//! Quadtree spatial index used by brush selection.
//!
//! Bulk-loaded from the document when a brush session starts, then queried
//! with the drag rectangle on every pointer move. Stored bounds are a
//! broad-phase filter; callers run the shape's own hit test on candidates.

use crate::shapes::ShapeId;
use kurbo::Rect;

/// Maximum tree depth before a node stops splitting.
const MAX_DEPTH: usize = 8;
/// Items a node holds before it splits.
const NODE_CAPACITY: usize = 16;

#[derive(Debug)]
struct QuadNode {
    bounds: Rect,
    depth: usize,
    items: Vec<(ShapeId, Rect)>,
    children: Option<Box<[QuadNode; 4]>>,
}

impl QuadNode {
    fn new(bounds: Rect, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, id: ShapeId, rect: Rect) {
        if let Some(children) = &mut self.children {
            for child in children.iter_mut() {
                if contains(child.bounds, rect) {
                    child.insert(id, rect);
                    return;
                }
            }
            // Straddles a boundary, keep it here
            self.items.push((id, rect));
            return;
        }

        self.items.push((id, rect));
        if self.items.len() > NODE_CAPACITY && self.depth < MAX_DEPTH {
            self.split();
        }
    }

    fn split(&mut self) {
        let b = self.bounds;
        let c = b.center();
        let depth = self.depth + 1;
        let mut children = Box::new([
            QuadNode::new(Rect::new(b.x0, b.y0, c.x, c.y), depth),
            QuadNode::new(Rect::new(c.x, b.y0, b.x1, c.y), depth),
            QuadNode::new(Rect::new(b.x0, c.y, c.x, b.y1), depth),
            QuadNode::new(Rect::new(c.x, c.y, b.x1, b.y1), depth),
        ]);
        let items = std::mem::take(&mut self.items);
        for (id, rect) in items {
            let mut placed = false;
            for child in children.iter_mut() {
                if contains(child.bounds, rect) {
                    child.insert(id.clone(), rect);
                    placed = true;
                    break;
                }
            }
            if !placed {
                self.items.push((id, rect));
            }
        }
        self.children = Some(children);
    }

    fn query(&self, rect: Rect, out: &mut Vec<ShapeId>) {
        if !intersects(self.bounds, rect) {
            return;
        }
        for (id, item_rect) in &self.items {
            if intersects(*item_rect, rect) {
                out.push(id.clone());
            }
        }
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query(rect, out);
            }
        }
    }
}

fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

fn contains(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// A quadtree over shape bounding boxes.
#[derive(Debug)]
pub struct SpatialIndex {
    root: QuadNode,
}

impl SpatialIndex {
    /// Create an empty index covering the given world bounds.
    pub fn new(bounds: Rect) -> Self {
        Self {
            root: QuadNode::new(bounds, 0),
        }
    }

    /// Bulk-load an index sized to fit every entry.
    pub fn bulk_load(entries: impl IntoIterator<Item = (ShapeId, Rect)>) -> Self {
        let entries: Vec<_> = entries.into_iter().collect();
        let world = entries
            .iter()
            .map(|(_, r)| *r)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::new(0.0, 0.0, 1.0, 1.0));
        let mut index = Self::new(world.inflate(1.0, 1.0));
        for (id, rect) in entries {
            index.insert(id, rect);
        }
        index
    }

    /// Insert a shape's bounding box.
    pub fn insert(&mut self, id: ShapeId, rect: Rect) {
        self.root.insert(id, rect);
    }

    /// Find shapes whose stored bounds intersect the query rectangle.
    pub fn query(&self, rect: Rect) -> Vec<ShapeId> {
        let mut out = Vec::new();
        self.root.query(rect, &mut out);
        out
    }
}
