use crate::assert_float_eq;
use crate::errors::LayoutError;
use crate::geometry::{Rect, Vec2};
use crate::quadtree::{BodyId, Charged, NodeId, QuadTree};

struct Point {
    position: Vec2,
    charge: f64,
}

impl Point {
    fn new(x: f64, y: f64, charge: f64) -> Self {
        Point {
            position: Vec2::new(x, y),
            charge,
        }
    }
}

impl Charged for Point {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn charge(&self) -> f64 {
        self.charge
    }
}

fn bounds() -> Rect {
    Rect::new(Vec2::new(-50.0, -50.0), Vec2::new(50.0, 50.0))
}

fn build_tree(points: &[Point]) -> QuadTree {
    let mut tree = QuadTree::new(bounds());
    for i in 0..points.len() {
        tree.insert(BodyId(i), points).unwrap();
    }
    tree
}

/// Walks the whole arena checking the structural invariants: internal counts
/// equal the sum of child counts, and every occupied leaf contains its
/// element's position.
fn check_invariants(tree: &QuadTree, points: &[Point]) {
    check_node(tree, tree.root_id(), points);
}

fn check_node(tree: &QuadTree, id: NodeId, points: &[Point]) -> usize {
    let node = tree.node(id);
    match (node.element, node.children) {
        (None, None) => {
            assert_eq!(node.count, 0, "empty leaf must have count 0");
            0
        }
        (Some(element), None) => {
            assert_eq!(node.count, 1, "occupied leaf must have count 1");
            assert!(
                node.bounds.contains(points[element.index()].position()),
                "occupied leaf element lies outside the leaf bounds"
            );
            1
        }
        (None, Some(children)) => {
            let total: usize = children
                .iter()
                .map(|&child| check_node(tree, child, points))
                .sum();
            assert_eq!(node.count, total, "internal count must equal child sum");
            assert!(total >= 2, "internal node must cover at least 2 elements");
            total
        }
        (Some(_), Some(_)) => panic!("node holds an element and children at once"),
    }
}

#[test]
fn test_insert_single_element() {
    let points = vec![Point::new(1.0, 2.0, 1.0)];
    let tree = build_tree(&points);

    assert_eq!(tree.len(), 1);
    let leaves: Vec<_> = tree.occupied_leaves().collect();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].0, BodyId(0));
    check_invariants(&tree, &points);
}

#[test]
fn test_insert_out_of_bounds_reports_and_leaves_tree_unchanged() {
    let points = vec![Point::new(1.0, 1.0, 1.0), Point::new(500.0, 0.0, 1.0)];
    let mut tree = QuadTree::new(bounds());
    tree.insert(BodyId(0), &points).unwrap();

    let result = tree.insert(BodyId(1), &points);
    assert_eq!(
        result,
        Err(LayoutError::OutOfBounds { x: 500.0, y: 0.0 })
    );
    assert_eq!(tree.len(), 1);
    check_invariants(&tree, &points);
}

#[test]
fn test_second_insert_subdivides_occupied_leaf() {
    let points = vec![Point::new(-10.0, -10.0, 1.0), Point::new(10.0, 10.0, 1.0)];
    let tree = build_tree(&points);

    assert_eq!(tree.len(), 2);
    assert!(tree.node(tree.root_id()).is_internal());
    let visited: Vec<_> = tree.occupied_leaves().map(|(id, _)| id).collect();
    assert_eq!(visited.len(), 2);
    assert!(visited.contains(&BodyId(0)));
    assert!(visited.contains(&BodyId(1)));
    check_invariants(&tree, &points);
}

#[test]
fn test_close_elements_subdivide_deeply() {
    // Both points share the NE quadrant for several levels.
    let points = vec![Point::new(1.0, 1.0, 1.0), Point::new(2.0, 1.0, 1.0)];
    let tree = build_tree(&points);

    assert_eq!(tree.len(), 2);
    check_invariants(&tree, &points);
}

#[test]
fn test_coincident_insert_fails_and_leaves_tree_unchanged() {
    // Identical positions can never be separated by subdivision; the insert
    // must report an error instead of descending forever, and must roll the
    // tree back to its prior shape.
    let points = vec![Point::new(1.0, 1.0, 1.0), Point::new(1.0, 1.0, 1.0)];
    let mut tree = QuadTree::new(bounds());
    tree.insert(BodyId(0), &points).unwrap();

    let result = tree.insert(BodyId(1), &points);
    assert_eq!(result, Err(LayoutError::OutOfBounds { x: 1.0, y: 1.0 }));
    assert_eq!(tree.len(), 1);
    let root = tree.node(tree.root_id());
    assert!(root.is_leaf());
    assert_eq!(root.element(), Some(BodyId(0)));
    check_invariants(&tree, &points);
}

#[test]
fn test_coincident_insert_failure_keeps_tree_usable() {
    let points = vec![
        Point::new(1.0, 1.0, 1.0),
        Point::new(1.0, 1.0, 1.0),
        Point::new(-10.0, -10.0, 1.0),
    ];
    let mut tree = QuadTree::new(bounds());
    tree.insert(BodyId(0), &points).unwrap();
    assert!(tree.insert(BodyId(1), &points).is_err());

    // The rollback returned every allocated node to the free list, so later
    // inserts keep working and the invariants hold.
    tree.insert(BodyId(2), &points).unwrap();
    assert_eq!(tree.len(), 2);
    check_invariants(&tree, &points);

    tree.remove(BodyId(0));
    assert_eq!(tree.len(), 1);
    check_invariants(&tree, &points);
}

#[test]
fn test_remove_present_element() {
    let points = vec![
        Point::new(-10.0, -10.0, 1.0),
        Point::new(10.0, 10.0, 1.0),
        Point::new(10.0, -10.0, 1.0),
    ];
    let mut tree = build_tree(&points);

    tree.remove(BodyId(1));
    assert_eq!(tree.len(), 2);
    let visited: Vec<_> = tree.occupied_leaves().map(|(id, _)| id).collect();
    assert!(!visited.contains(&BodyId(1)));
    check_invariants(&tree, &points);
}

#[test]
fn test_remove_absent_element_is_noop() {
    let points = vec![Point::new(-10.0, -10.0, 1.0), Point::new(10.0, 10.0, 1.0)];
    let mut tree = build_tree(&points);

    tree.remove(BodyId(7));
    assert_eq!(tree.len(), 2);
    tree.remove(BodyId(1));
    tree.remove(BodyId(1));
    assert_eq!(tree.len(), 1);
    check_invariants(&tree, &points);
}

#[test]
fn test_removal_consolidates_to_occupied_leaf() {
    let points = vec![
        Point::new(-10.0, -10.0, 1.0),
        Point::new(10.0, 10.0, 1.0),
        Point::new(10.0, -10.0, 1.0),
    ];
    let mut tree = build_tree(&points);
    assert!(tree.node(tree.root_id()).is_internal());

    tree.remove(BodyId(0));
    tree.remove(BodyId(2));

    // A single survivor must be hoisted back into the root leaf.
    let root = tree.node(tree.root_id());
    assert!(root.is_leaf());
    assert_eq!(root.element(), Some(BodyId(1)));
    assert_eq!(tree.len(), 1);
    check_invariants(&tree, &points);
}

#[test]
fn test_consolidated_nodes_are_reused() {
    let points = vec![
        Point::new(-10.0, -10.0, 1.0),
        Point::new(10.0, 10.0, 1.0),
        Point::new(10.0, -10.0, 1.0),
    ];
    let mut tree = build_tree(&points);

    let populated_size = tree.arena_size();
    tree.remove(BodyId(0));
    tree.remove(BodyId(2));
    // Reinserting must not grow the arena: the freed children are recycled.
    tree.insert(BodyId(0), &points).unwrap();
    tree.insert(BodyId(2), &points).unwrap();
    assert_eq!(tree.arena_size(), populated_size);
    assert_eq!(tree.len(), 3);
    check_invariants(&tree, &points);
}

#[test]
fn test_aggregate_center_is_mean_of_positions() {
    let points = vec![
        Point::new(-20.0, -20.0, 1.0),
        Point::new(20.0, 20.0, 2.0),
        Point::new(20.0, -20.0, 3.0),
    ];
    let mut tree = build_tree(&points);
    tree.recompute_aggregates(&points);

    let root = tree.node(tree.root_id());
    // Count-weighted mean of child centers equals the plain mean of all
    // positions; charge is the unweighted sum.
    assert_float_eq(root.aggregate_center().x, 20.0 / 3.0, 1e-12, None);
    assert_float_eq(root.aggregate_center().y, -20.0 / 3.0, 1e-12, None);
    assert_float_eq(root.aggregate_charge(), 6.0, 1e-12, None);
}

#[test]
fn test_aggregate_recompute_is_idempotent() {
    let points = vec![
        Point::new(-20.0, -20.0, 1.5),
        Point::new(20.0, 20.0, -2.5),
        Point::new(5.0, -7.0, 3.0),
        Point::new(6.0, -7.5, 0.5),
    ];
    let mut tree = build_tree(&points);

    tree.recompute_aggregates(&points);
    let first: Vec<(Vec2, f64)> = tree
        .occupied_leaves()
        .map(|(_, node)| (node.aggregate_center(), node.aggregate_charge()))
        .collect();
    let first_root = (
        tree.node(tree.root_id()).aggregate_center(),
        tree.node(tree.root_id()).aggregate_charge(),
    );

    tree.recompute_aggregates(&points);
    let second: Vec<(Vec2, f64)> = tree
        .occupied_leaves()
        .map(|(_, node)| (node.aggregate_center(), node.aggregate_charge()))
        .collect();
    let second_root = (
        tree.node(tree.root_id()).aggregate_center(),
        tree.node(tree.root_id()).aggregate_charge(),
    );

    assert_eq!(first, second);
    assert_eq!(first_root, second_root);
}

#[test]
fn test_leaf_aggregates_track_current_position() {
    let mut points = vec![Point::new(1.0, 1.0, 2.0)];
    let mut tree = build_tree(&points);

    tree.recompute_aggregates(&points);
    assert_eq!(
        tree.node(tree.root_id()).aggregate_center(),
        Vec2::new(1.0, 1.0)
    );

    // The element moved; aggregates are stale until recomputed.
    points[0].position = Vec2::new(3.0, -4.0);
    tree.recompute_aggregates(&points);
    assert_eq!(
        tree.node(tree.root_id()).aggregate_center(),
        Vec2::new(3.0, -4.0)
    );
    assert_float_eq(tree.node(tree.root_id()).aggregate_charge(), 2.0, 1e-12, None);
}

#[test]
fn test_traversal_visits_each_occupied_leaf_once() {
    let points: Vec<Point> = (0..20)
        .map(|i| Point::new(-45.0 + 4.7 * i as f64, 40.0 - 4.1 * i as f64, 1.0))
        .collect();
    let tree = build_tree(&points);

    let mut visited: Vec<usize> = tree.occupied_leaves().map(|(id, _)| id.index()).collect();
    visited.sort_unstable();
    let expected: Vec<usize> = (0..20).collect();
    assert_eq!(visited, expected);
    check_invariants(&tree, &points);
}

#[test]
fn test_traversal_exposes_leaf_bounds() {
    let points = vec![Point::new(-10.0, -10.0, 1.0), Point::new(10.0, 10.0, 1.0)];
    let tree = build_tree(&points);

    for (id, node) in tree.occupied_leaves() {
        assert!(node.bounds().contains(points[id.index()].position()));
    }
}

#[test]
fn test_invariants_after_mixed_operations() {
    let mut points: Vec<Point> = (0..32)
        .map(|i| {
            let x = ((i * 37) % 97) as f64 - 48.0;
            let y = ((i * 61) % 89) as f64 - 44.0;
            Point::new(x, y, if i % 2 == 0 { 1.0 } else { -1.0 })
        })
        .collect();
    let mut tree = build_tree(&points);
    check_invariants(&tree, &points);

    for i in (0..32).step_by(3) {
        tree.remove(BodyId(i));
    }
    check_invariants(&tree, &points);

    for (i, point) in points.iter_mut().enumerate() {
        if i % 3 == 0 {
            point.position = Vec2::new(point.position.x / 2.0, point.position.y / 2.0);
        }
    }
    for i in (0..32).step_by(3) {
        tree.insert(BodyId(i), &points).unwrap();
    }
    assert_eq!(tree.len(), 32);
    check_invariants(&tree, &points);

    tree.recompute_aggregates(&points);
    check_invariants(&tree, &points);
}
