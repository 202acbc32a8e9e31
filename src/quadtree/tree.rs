use crate::errors::LayoutError;
use crate::geometry::{Rect, Vec2};
use crate::quadtree::node::QuadNode;
use crate::quadtree::{BodyId, Charged, NodeId};

/// A region quadtree over a fixed rectangular area.
///
/// Nodes live in an index-addressed arena; an internal node stores the arena
/// indices of its four children and consolidated nodes return their children
/// to a free list. Elements are identified by [`BodyId`] and their positions
/// and charges are read through the [`Charged`] contract from host-owned
/// storage passed into each operation.
///
/// # Examples
///
/// ```
/// use force_layout::geometry::{Rect, Vec2};
/// use force_layout::quadtree::{BodyId, Charged, QuadTree};
///
/// struct Point {
///     position: Vec2,
///     charge: f64,
/// }
///
/// impl Charged for Point {
///     fn position(&self) -> Vec2 { self.position }
///     fn charge(&self) -> f64 { self.charge }
/// }
///
/// let points = vec![
///     Point { position: Vec2::new(-1.0, -1.0), charge: 1.0 },
///     Point { position: Vec2::new(2.0, 3.0), charge: -1.0 },
/// ];
///
/// let bounds = Rect::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0));
/// let mut tree = QuadTree::new(bounds);
/// tree.insert(BodyId(0), &points).unwrap();
/// tree.insert(BodyId(1), &points).unwrap();
/// assert_eq!(tree.len(), 2);
///
/// tree.recompute_aggregates(&points);
/// tree.remove(BodyId(0));
/// assert_eq!(tree.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    free: Vec<NodeId>,
    root: NodeId,
}

impl QuadTree {
    /// Creates an empty tree covering `bounds`.
    pub fn new(bounds: Rect) -> Self {
        QuadTree {
            nodes: vec![QuadNode::new(bounds)],
            free: Vec::new(),
            root: 0,
        }
    }

    /// The region covered by the root node.
    pub fn bounds(&self) -> Rect {
        self.nodes[self.root].bounds
    }

    /// Number of elements currently stored in the tree.
    pub fn len(&self) -> usize {
        self.nodes[self.root].count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn root_id(&self) -> NodeId {
        self.root
    }

    #[cfg(test)]
    pub(crate) fn arena_size(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id]
    }

    /// Inserts the element identified by `id`, reading its position from
    /// `particles`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfBounds`] and leaves the tree unchanged if
    /// the element's position lies outside the tree bounds, or if it
    /// coincides with a resident element so closely that no subdivision can
    /// separate the two.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not index into `particles`.
    pub fn insert<P: Charged>(&mut self, id: BodyId, particles: &[P]) -> Result<(), LayoutError> {
        let position = particles[id.index()].position();
        self.insert_at(self.root, id, position, particles)
    }

    fn insert_at<P: Charged>(
        &mut self,
        node: NodeId,
        id: BodyId,
        position: Vec2,
        particles: &[P],
    ) -> Result<(), LayoutError> {
        if !self.nodes[node].bounds.contains(position) {
            return Err(LayoutError::OutOfBounds {
                x: position.x,
                y: position.y,
            });
        }

        if let Some(children) = self.nodes[node].children {
            return self.insert_into_child(node, children, id, position, particles);
        }

        match self.nodes[node].element {
            None => {
                // Empty leaf: store directly.
                self.nodes[node].element = Some(id);
                self.nodes[node].count = 1;
                Ok(())
            }
            Some(existing) => {
                // Subdivision must strictly shrink the region on both axes.
                // Near ULP scale the midpoint rounds onto an edge and descent
                // stops making progress, which is where coincident elements
                // end up: no amount of splitting can separate them.
                let bounds = self.nodes[node].bounds;
                let mid = bounds.center();
                if mid.x <= bounds.min.x
                    || mid.x >= bounds.max.x
                    || mid.y <= bounds.min.y
                    || mid.y >= bounds.max.y
                {
                    return Err(LayoutError::OutOfBounds {
                        x: position.x,
                        y: position.y,
                    });
                }

                // Occupied leaf: subdivide, then push the resident element
                // down before the new one. Both insertions land inside a
                // quadrant because the quadrants partition the bounds exactly.
                let children = self.allocate_children(node);
                self.nodes[node].element = None;
                self.nodes[node].children = Some(children);
                self.nodes[node].count = 0;

                let existing_position = particles[existing.index()].position();
                let result = self
                    .insert_into_child(node, children, existing, existing_position, particles)
                    .and_then(|()| self.insert_into_child(node, children, id, position, particles));
                if result.is_err() {
                    // A failed insert leaves the tree unchanged. Deeper frames
                    // have already rolled back, so the resident element sits
                    // in a direct child again; undo the subdivision and
                    // restore it as this leaf's occupant.
                    for child in children {
                        self.free.push(child);
                    }
                    self.nodes[node].children = None;
                    self.nodes[node].element = Some(existing);
                    self.nodes[node].count = 1;
                }
                result
            }
        }
    }

    fn insert_into_child<P: Charged>(
        &mut self,
        node: NodeId,
        children: [NodeId; 4],
        id: BodyId,
        position: Vec2,
        particles: &[P],
    ) -> Result<(), LayoutError> {
        for child in children {
            if self.nodes[child].bounds.contains(position) {
                self.insert_at(child, id, position, particles)?;
                self.nodes[node].count += 1;
                return Ok(());
            }
        }
        // The parent contains the position, so exactly one child claims it;
        // reaching this point means the caller bypassed the bounds check.
        Err(LayoutError::OutOfBounds {
            x: position.x,
            y: position.y,
        })
    }

    fn allocate_children(&mut self, node: NodeId) -> [NodeId; 4] {
        let quadrants = self.nodes[node].bounds.quadrants();
        quadrants.map(|bounds| self.allocate(bounds))
    }

    fn allocate(&mut self, bounds: Rect) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = QuadNode::new(bounds);
                id
            }
            None => {
                self.nodes.push(QuadNode::new(bounds));
                self.nodes.len() - 1
            }
        }
    }

    /// Removes the element identified by `id`. Removing an element that is
    /// not present is a no-op.
    pub fn remove(&mut self, id: BodyId) {
        let _ = self.remove_at(self.root, id);
    }

    fn remove_at(&mut self, node: NodeId, id: BodyId) -> bool {
        if self.nodes[node].element == Some(id) {
            self.nodes[node].element = None;
            self.nodes[node].count = 0;
            return true;
        }

        let Some(children) = self.nodes[node].children else {
            return false;
        };

        let mut removed = false;
        for child in children {
            if self.remove_at(child, id) {
                self.nodes[node].count -= 1;
                removed = true;
            }
        }

        // A lone survivor is hoisted up and the children discarded, so the
        // tree never keeps chains of near-empty internal nodes.
        if removed && self.nodes[node].count == 1 {
            self.consolidate(node, children);
        }
        removed
    }

    fn consolidate(&mut self, node: NodeId, children: [NodeId; 4]) {
        let mut survivor = None;
        for child in children {
            if let Some(element) = self.nodes[child].element {
                survivor = Some(element);
            }
            self.free.push(child);
        }
        debug_assert!(survivor.is_some());
        self.nodes[node].children = None;
        self.nodes[node].element = survivor;
    }

    /// Recomputes every node's aggregate center and charge from the current
    /// element positions. Must be called after elements move and before the
    /// aggregates are read.
    ///
    /// An occupied leaf's aggregates are its element's position and charge.
    /// An internal node's center is the count-weighted mean of its children's
    /// centers (the arithmetic mean of all descendant positions) and its
    /// charge is the plain sum of its children's charges.
    pub fn recompute_aggregates<P: Charged>(&mut self, particles: &[P]) {
        self.compute_center(self.root, particles);
    }

    fn compute_center<P: Charged>(&mut self, node: NodeId, particles: &[P]) -> (Vec2, f64) {
        if let Some(children) = self.nodes[node].children {
            let mut weighted = Vec2::ZERO;
            let mut charge = 0.0;
            for child in children {
                let (child_center, child_charge) = self.compute_center(child, particles);
                weighted += child_center * self.nodes[child].count as f64;
                charge += child_charge;
            }
            let count = self.nodes[node].count;
            let center = if count > 0 {
                weighted / count as f64
            } else {
                self.nodes[node].center
            };
            self.nodes[node].center = center;
            self.nodes[node].charge = charge;
            return (center, charge);
        }

        match self.nodes[node].element {
            Some(id) => {
                let center = particles[id.index()].position();
                let charge = particles[id.index()].charge();
                self.nodes[node].center = center;
                self.nodes[node].charge = charge;
                (center, charge)
            }
            // Empty leaves keep their stale values and contribute nothing.
            None => (self.nodes[node].center, 0.0),
        }
    }

    /// Depth-first traversal over every occupied leaf, yielding the element
    /// id together with the node that holds it, so callers can inspect the
    /// leaf's bounds. Each occupied leaf is visited exactly once per
    /// traversal; the order is unspecified.
    pub fn occupied_leaves(&self) -> OccupiedLeaves<'_> {
        OccupiedLeaves {
            tree: self,
            stack: vec![self.root],
        }
    }
}

/// Iterator over the occupied leaves of a [`QuadTree`]. Created by
/// [`QuadTree::occupied_leaves`].
pub struct OccupiedLeaves<'a> {
    tree: &'a QuadTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for OccupiedLeaves<'a> {
    type Item = (BodyId, &'a QuadNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(index) = self.stack.pop() {
            let node = &self.tree.nodes[index];
            if let Some(children) = node.children {
                self.stack.extend(children);
            } else if let Some(id) = node.element {
                return Some((id, node));
            }
        }
        None
    }
}
