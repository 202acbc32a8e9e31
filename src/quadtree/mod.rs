mod node;
mod tree;

pub use node::*;
pub use tree::*;

#[cfg(test)]
mod quadtree_tests;

use crate::geometry::Vec2;

/// Index of a node within the tree's arena.
pub(crate) type NodeId = usize;

/// The capability a type must provide to live in a [`QuadTree`]: a readable
/// position and a readable signed charge. Resolved at compile time; the tree
/// never assumes anything else about its elements.
pub trait Charged {
    fn position(&self) -> Vec2;
    fn charge(&self) -> f64;
}

/// A stable identifier for a body tracked by the tree.
///
/// Tree membership is decided by comparing these identifiers, never by value
/// or address equality. The identifier is the body's slot index in the
/// host-owned particle storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(&self) -> usize {
        self.0
    }
}
