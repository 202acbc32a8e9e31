use crate::geometry::{Rect, Vec2};
use crate::quadtree::{BodyId, NodeId};

/// One node of the region quadtree.
///
/// A node is always in exactly one of three states:
/// - an empty leaf: no element, no children, count 0;
/// - an occupied leaf: one element, no children, count 1;
/// - an internal node: no element, four children covering the four equal
///   quadrants of its bounds, count equal to the sum of the children's counts.
///
/// The aggregate center and charge summarize every element beneath the node.
/// They are only meaningful after [`QuadTree::recompute_aggregates`] and go
/// stale as soon as an element is inserted, removed, or moved.
///
/// [`QuadTree::recompute_aggregates`]: crate::quadtree::QuadTree::recompute_aggregates
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub(crate) bounds: Rect,
    pub(crate) element: Option<BodyId>,
    pub(crate) children: Option<[NodeId; 4]>,
    pub(crate) count: usize,
    pub(crate) center: Vec2,
    pub(crate) charge: f64,
}

impl QuadNode {
    pub(crate) fn new(bounds: Rect) -> Self {
        QuadNode {
            bounds,
            element: None,
            children: None,
            count: 0,
            center: Vec2::ZERO,
            charge: 0.0,
        }
    }

    /// The immutable region this node covers.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Number of elements stored at or beneath this node.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The element stored directly in this node, if it is an occupied leaf.
    pub fn element(&self) -> Option<BodyId> {
        self.element
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn is_internal(&self) -> bool {
        self.children.is_some()
    }

    /// Aggregate center of the elements beneath this node, as of the last
    /// recompute pass.
    pub fn aggregate_center(&self) -> Vec2 {
        self.center
    }

    /// Aggregate charge of the elements beneath this node, as of the last
    /// recompute pass.
    pub fn aggregate_charge(&self) -> f64 {
        self.charge
    }
}
