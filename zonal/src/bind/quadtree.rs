//! A claimable quad-tree over zone footprints.

use geo::{geometry::Rect, Intersects};

const BUCKET: usize = 16;
const MAX_DEPTH: usize = 8;

/// Quad-tree of zone bounding boxes, keyed by zone position.
///
/// Removal on match is part of this index's contract, not an
/// afterthought: the binder claims a zone by removing it, and a
/// removed zone is never returned by a later query. Queries return
/// candidates whose bounding box overlaps; exact geometry tests are
/// the caller's.
#[derive(Debug)]
pub struct QuadTree {
    root: Node,
    entries: Vec<Option<Rect<f64>>>,
    len: usize,
}

impl QuadTree {
    /// An empty tree spanning `bounds`.
    pub fn new(bounds: Rect<f64>) -> Self {
        Self {
            root: Node::new(bounds, 0),
            entries: Vec::new(),
            len: 0,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts the entry for zone `position`.
    ///
    /// Re-inserting a position replaces its previous footprint.
    pub fn insert(&mut self, position: usize, bounds: Rect<f64>) {
        if position >= self.entries.len() {
            self.entries.resize(position + 1, None);
        }
        if self.entries[position].replace(bounds).is_none() {
            self.len += 1;
        }
        self.root.insert(position, &bounds, &self.entries);
    }

    /// Collects into `out` the positions of live entries whose bounds
    /// intersect `bounds`.
    pub fn query(&self, bounds: &Rect<f64>, out: &mut Vec<usize>) {
        self.root.query(bounds, &self.entries, out);
    }

    /// Removes the entry for zone `position`; a no-op if absent.
    ///
    /// Dead entries are skipped by queries rather than unlinked from
    /// node buckets, keeping removal O(1).
    pub fn remove(&mut self, position: usize) {
        if let Some(slot) = self.entries.get_mut(position) {
            if slot.take().is_some() {
                self.len -= 1;
            }
        }
    }
}

#[derive(Debug)]
struct Node {
    bounds: Rect<f64>,
    items: Vec<usize>,
    children: Option<Box<[Node; 4]>>,
    depth: usize,
}

impl Node {
    fn new(bounds: Rect<f64>, depth: usize) -> Self {
        Self {
            bounds,
            items: Vec::new(),
            children: None,
            depth,
        }
    }

    fn insert(&mut self, position: usize, bounds: &Rect<f64>, entries: &[Option<Rect<f64>>]) {
        if let Some(children) = &mut self.children {
            if let Some(child) = children
                .iter_mut()
                .find(|child| contains(&child.bounds, bounds))
            {
                child.insert(position, bounds, entries);
            } else {
                self.items.push(position);
            }
            return;
        }
        self.items.push(position);
        if self.items.len() > BUCKET && self.depth < MAX_DEPTH {
            self.split(entries);
        }
    }

    fn split(&mut self, entries: &[Option<Rect<f64>>]) {
        let center = self.bounds.center();
        let min = self.bounds.min();
        let max = self.bounds.max();
        self.children = Some(Box::new([
            Node::new(Rect::new(min, center), self.depth + 1),
            Node::new(
                Rect::new((center.x, min.y), (max.x, center.y)),
                self.depth + 1,
            ),
            Node::new(
                Rect::new((min.x, center.y), (center.x, max.y)),
                self.depth + 1,
            ),
            Node::new(Rect::new(center, max), self.depth + 1),
        ]));
        // Items that fully fit a quadrant sink into it; stragglers and
        // dead entries stay behind.
        let items = std::mem::take(&mut self.items);
        for position in items {
            match entries.get(position) {
                Some(Some(bounds)) => {
                    let bounds = *bounds;
                    self.insert_into_child(position, &bounds, entries);
                }
                _ => self.items.push(position),
            }
        }
    }

    fn insert_into_child(
        &mut self,
        position: usize,
        bounds: &Rect<f64>,
        entries: &[Option<Rect<f64>>],
    ) {
        if let Some(child) = self
            .children
            .iter_mut()
            .flat_map(|children| children.iter_mut())
            .find(|child| contains(&child.bounds, bounds))
        {
            child.insert(position, bounds, entries);
        } else {
            self.items.push(position);
        }
    }

    fn query(&self, bounds: &Rect<f64>, entries: &[Option<Rect<f64>>], out: &mut Vec<usize>) {
        if !self.bounds.intersects(bounds) {
            return;
        }
        for &position in &self.items {
            if let Some(Some(entry)) = entries.get(position) {
                if entry.intersects(bounds) {
                    out.push(position);
                }
            }
        }
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query(bounds, entries, out);
            }
        }
    }
}

/// True when `outer` fully contains `inner`.
fn contains(outer: &Rect<f64>, inner: &Rect<f64>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && outer.max().x >= inner.max().x
        && outer.max().y >= inner.max().y
}
