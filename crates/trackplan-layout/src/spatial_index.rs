//! Hit-test index.
//!
//! The layout decides *when* pieces enter and leave the index (see
//! [`Layout`](crate::Layout)); [`HitTestIndex`] is the seam that lets a host
//! application bring its own structure. [`SpatialIndex`] is the bundled
//! quadtree implementation.

use trackplan_core::{PieceId, Pose};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Creates bounds from two corners, normalizing their order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Loose bounds of a `width` x `height` rectangle centred on `pose` and
    /// rotated by its angle: the AABB of the four rotated corners.
    pub fn of_rotated_rect(pose: &Pose, width: f64, height: f64) -> Self {
        let (s, c) = pose.angle.sin_cos();
        let hw = width / 2.0;
        let hh = height / 2.0;
        let corners = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)];
        let mut bounds = Bounds::new(pose.x, pose.y, pose.x, pose.y);
        for (lx, ly) in corners {
            let x = pose.x + lx * c - ly * s;
            let y = pose.y + lx * s + ly * c;
            bounds = bounds.union(&Bounds::new(x, y, x, y));
        }
        bounds
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// True when `other` lies entirely inside these bounds.
    pub fn contains(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// The hit-testing collaborator.
pub trait HitTestIndex {
    fn insert(&mut self, id: PieceId, bounds: &Bounds);

    /// Removes an item. `bounds` must be the bounds it was inserted with.
    fn remove(&mut self, id: PieceId, bounds: &Bounds) -> bool;

    /// Items whose bounds intersect `area`.
    fn search(&self, area: &Bounds) -> Vec<PieceId>;

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Statistics about the quadtree shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialIndexStats {
    pub total_items: usize,
    pub node_count: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone)]
struct QuadtreeNode {
    bounds: Bounds,
    depth: usize,
    items: Vec<(PieceId, Bounds)>,
    children: Option<Box<[QuadtreeNode; 4]>>,
}

impl QuadtreeNode {
    fn new(bounds: Bounds, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, id: PieceId, bounds: Bounds, max_depth: usize, max_items: usize) {
        if let Some(children) = self.children.as_mut() {
            if let Some(child) = children.iter_mut().find(|c| c.bounds.contains(&bounds)) {
                child.insert(id, bounds, max_depth, max_items);
                return;
            }
            self.items.push((id, bounds));
            return;
        }

        self.items.push((id, bounds));
        if self.items.len() > max_items && self.depth < max_depth {
            self.split(max_depth, max_items);
        }
    }

    fn split(&mut self, max_depth: usize, max_items: usize) {
        let (cx, cy) = self.bounds.center();
        let b = self.bounds;
        let depth = self.depth + 1;
        self.children = Some(Box::new([
            QuadtreeNode::new(Bounds::new(b.min_x, b.min_y, cx, cy), depth),
            QuadtreeNode::new(Bounds::new(cx, b.min_y, b.max_x, cy), depth),
            QuadtreeNode::new(Bounds::new(b.min_x, cy, cx, b.max_y), depth),
            QuadtreeNode::new(Bounds::new(cx, cy, b.max_x, b.max_y), depth),
        ]));
        for (id, bounds) in std::mem::take(&mut self.items) {
            self.insert(id, bounds, max_depth, max_items);
        }
    }

    fn remove(&mut self, id: PieceId, bounds: &Bounds) -> bool {
        if let Some(pos) = self.items.iter().position(|(item, _)| *item == id) {
            self.items.swap_remove(pos);
            return true;
        }
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.bounds.intersects(bounds) && child.remove(id, bounds) {
                    return true;
                }
            }
        }
        false
    }

    fn remove_anywhere(&mut self, id: PieceId) -> bool {
        if let Some(pos) = self.items.iter().position(|(item, _)| *item == id) {
            self.items.swap_remove(pos);
            return true;
        }
        self.children
            .as_mut()
            .is_some_and(|children| children.iter_mut().any(|c| c.remove_anywhere(id)))
    }

    fn query(&self, area: &Bounds, out: &mut Vec<PieceId>) {
        out.extend(
            self.items
                .iter()
                .filter(|(_, bounds)| bounds.intersects(area))
                .map(|(id, _)| *id),
        );
        if let Some(children) = self.children.as_ref() {
            for child in children.iter().filter(|c| c.bounds.intersects(area)) {
                child.query(area, out);
            }
        }
    }

    fn collect_stats(&self, stats: &mut SpatialIndexStats) {
        stats.total_items += self.items.len();
        stats.node_count += 1;
        stats.max_depth = stats.max_depth.max(self.depth);
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.collect_stats(stats);
            }
        }
    }
}

/// Quadtree over piece bounds.
///
/// Items that do not fit inside the root bounds stay in the root node, so the
/// index never loses a piece placed far from the origin.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    root: QuadtreeNode,
    max_depth: usize,
    max_items: usize,
    len: usize,
}

impl SpatialIndex {
    pub fn new(bounds: Bounds, max_depth: usize, max_items: usize) -> Self {
        Self {
            root: QuadtreeNode::new(bounds, 0),
            max_depth,
            max_items: max_items.max(1),
            len: 0,
        }
    }

    /// Items whose bounds contain the point.
    pub fn query_point(&self, x: f64, y: f64) -> Vec<PieceId> {
        self.search(&Bounds::new(x, y, x, y))
    }

    pub fn stats(&self) -> SpatialIndexStats {
        let mut stats = SpatialIndexStats {
            total_items: 0,
            node_count: 0,
            max_depth: 0,
        };
        self.root.collect_stats(&mut stats);
        stats
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(
            Bounds::new(-100_000.0, -100_000.0, 100_000.0, 100_000.0),
            8,
            16,
        )
    }
}

impl HitTestIndex for SpatialIndex {
    fn insert(&mut self, id: PieceId, bounds: &Bounds) {
        self.root.insert(id, *bounds, self.max_depth, self.max_items);
        self.len += 1;
    }

    fn remove(&mut self, id: PieceId, bounds: &Bounds) -> bool {
        let removed = self.root.remove(id, bounds) || self.root.remove_anywhere(id);
        if removed {
            self.len -= 1;
        }
        removed
    }

    fn search(&self, area: &Bounds) -> Vec<PieceId> {
        let mut out = Vec::new();
        self.root.query(area, &mut out);
        out
    }

    fn clear(&mut self) {
        self.root = QuadtreeNode::new(self.root.bounds, 0);
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }
}
