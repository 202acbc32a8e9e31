//! The per-tick Barnes-Hut force accumulation step.
//!
//! Each tick recomputes the tree aggregates, accumulates an approximate net
//! force for every particle by traversing the tree, delivers the forces to
//! the host, and restructures the tree for particles that left their leaf
//! region. The force phase only reads the tree, so it runs as a parallel map
//! over the particles with Rayon; the restructuring phase is sequential.

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::errors::LayoutError;
use crate::geometry::{Rect, Vec2};
use crate::layout::{Body, ForceBodyNode, LayoutConfig};
use crate::quadtree::{BodyId, Charged, NodeId, QuadTree};

/// Displacement components smaller than this are jiggled before the force
/// direction is derived, so coincident points never produce an undefined
/// normalization.
const JIGGLE_EPSILON: f64 = 1e-6;

/// A Barnes-Hut force simulation over a set of host-owned particles.
///
/// The simulation tracks each particle through a stable [`BodyId`] slot index
/// into the host's storage, which the host passes into every call. It
/// computes approximate pairwise repulsion/attraction forces (same-sign
/// charges repel, opposite-sign attract, inverse-square falloff) and hands
/// each particle its net force once per tick; moving the particle is the
/// host's job.
///
/// # Examples
///
/// ```
/// use force_layout::geometry::{Rect, Vec2};
/// use force_layout::layout::{ForceSimulation, LayoutConfig, PointBody};
///
/// let mut particles = vec![
///     PointBody::new(Vec2::new(-5.0, 0.0), 1.0),
///     PointBody::new(Vec2::new(5.0, 0.0), 1.0),
/// ];
///
/// let bounds = Rect::new(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0));
/// let mut sim = ForceSimulation::new(bounds, &particles, LayoutConfig::default())
///     .expect("Failed to create simulation");
///
/// sim.step(&mut particles, 0.016);
///
/// // Two like charges push each other apart.
/// assert!(particles[0].position.x < -5.0);
/// assert!(particles[1].position.x > 5.0);
/// ```
pub struct ForceSimulation {
    tree: QuadTree,
    bodies: Vec<ForceBodyNode>,
    config: LayoutConfig,
    detached: Vec<BodyId>,
    tick: u64,
}

impl ForceSimulation {
    /// Creates a simulation over `particles`, inserting every particle into a
    /// fresh tree covering `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidBounds`] for a degenerate bounds
    /// rectangle, a configuration error if `config` is invalid, or
    /// [`LayoutError::OutOfBounds`] if an initial position lies outside
    /// `bounds`.
    pub fn new<P: Body>(
        bounds: Rect,
        particles: &[P],
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        if !(bounds.width() > 0.0) || !(bounds.height() > 0.0) {
            return Err(LayoutError::InvalidBounds);
        }
        config.validate()?;

        let mut tree = QuadTree::new(bounds);
        let mut bodies = Vec::with_capacity(particles.len());
        for index in 0..particles.len() {
            let id = BodyId(index);
            tree.insert(id, particles)?;
            bodies.push(ForceBodyNode::new(id));
        }

        Ok(ForceSimulation {
            tree,
            bodies,
            config,
            detached: Vec::new(),
            tick: 0,
        })
    }

    /// The region covered by the simulation's tree.
    pub fn bounds(&self) -> Rect {
        self.tree.bounds()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Number of particles the simulation was built over.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// The force accumulated for `id` during the most recent tick.
    pub fn force(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(id.index()).map(|body| body.force())
    }

    /// Lazy, restartable iteration over the particles currently held by the
    /// tree, one tree traversal per pass. Safe to call between ticks.
    /// Particles parked outside the bounds (see [`ForceSimulation::step`])
    /// are omitted until they are readmitted.
    pub fn iter(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.tree.occupied_leaves().map(|(id, _)| id)
    }

    /// Advances the simulation by one tick.
    ///
    /// `dt` is an elapsed-time hint for the host's benefit; the force model
    /// itself does not use it.
    ///
    /// The tick recomputes the aggregates, accumulates and delivers every
    /// particle's net force, then removes and reinserts the particles whose
    /// new position fell outside their leaf's bounds (the whole batch is
    /// removed before any reinsertion). A particle the host moved outside the
    /// simulation bounds cannot be reinserted; it is parked with a warning
    /// and reinsertion is retried at the start of every following tick.
    /// While parked it takes no part in the tree forces and accumulates only
    /// the clustering pull.
    pub fn step<P: Body + Sync>(&mut self, particles: &mut [P], _dt: f64) {
        self.tick += 1;
        self.readmit_detached(particles);
        self.tree.recompute_aggregates(particles);

        let tree = &self.tree;
        let config = self.config;
        let tick = self.tick;
        let detached = &self.detached;
        let shared: &[P] = particles;
        self.bodies.par_iter_mut().for_each(|body| {
            let id = body.id();
            // A parked body is outside the tree in both directions: it exerts
            // no tree force and receives none, but the clustering pull still
            // applies so it can drift back toward the layout.
            let force = if detached.contains(&id) {
                centering_pull(shared[id.index()].position(), &config)
            } else {
                let mut expansions = 0usize;
                accumulate_force(tree, shared, id, &config, tick, &mut expansions)
            };
            body.set_force(force);
        });

        for body in &self.bodies {
            particles[body.id().index()].apply_force(body.force());
        }

        self.restructure(particles);
    }

    /// Runs `steps` ticks back to back.
    pub fn advance<P: Body + Sync>(&mut self, particles: &mut [P], steps: usize, dt: f64) {
        for _ in 0..steps {
            self.step(particles, dt);
        }
    }

    /// Collects every particle whose post-move position escaped its leaf's
    /// bounds, removes the whole batch, then reinserts it.
    fn restructure<P: Charged>(&mut self, particles: &[P]) {
        let escaped: Vec<BodyId> = self
            .tree
            .occupied_leaves()
            .filter(|(id, node)| !node.bounds().contains(particles[id.index()].position()))
            .map(|(id, _)| id)
            .collect();

        for &id in &escaped {
            self.tree.remove(id);
        }
        for id in escaped {
            if let Err(err) = self.tree.insert(id, particles) {
                warn!(
                    "body {} left the simulation bounds ({}); parking it until it returns",
                    id.index(),
                    err
                );
                self.detached.push(id);
            }
        }
    }

    fn readmit_detached<P: Charged>(&mut self, particles: &[P]) {
        if self.detached.is_empty() {
            return;
        }
        let mut still_outside = Vec::new();
        for id in std::mem::take(&mut self.detached) {
            if self.tree.insert(id, particles).is_err() {
                still_outside.push(id);
            }
        }
        self.detached = still_outside;
    }

    #[cfg(test)]
    pub(crate) fn detached_len(&self) -> usize {
        self.detached.len()
    }

    /// Test probe: the force on `id` at the current aggregates, together with
    /// the number of region expansions the traversal performed.
    #[cfg(test)]
    pub(crate) fn probe_force<P: Charged>(
        &self,
        particles: &[P],
        id: BodyId,
    ) -> (Vec2, usize) {
        let mut expansions = 0usize;
        let force = accumulate_force(
            &self.tree,
            particles,
            id,
            &self.config,
            self.tick,
            &mut expansions,
        );
        (force, expansions)
    }
}

/// Net force on one particle: the Barnes-Hut traversal plus the clustering
/// pull.
fn accumulate_force<P: Charged>(
    tree: &QuadTree,
    particles: &[P],
    id: BodyId,
    config: &LayoutConfig,
    tick: u64,
    expansions: &mut usize,
) -> Vec2 {
    let position = particles[id.index()].position();
    let charge = particles[id.index()].charge();
    let mut rng = jiggle_rng(config.jiggle_seed, tick, id);

    let mut force = traverse(
        tree,
        tree.root_id(),
        particles,
        id,
        position,
        charge,
        config,
        &mut rng,
        expansions,
    );
    force += centering_pull(position, config);
    force
}

#[allow(clippy::too_many_arguments)]
fn traverse<P: Charged>(
    tree: &QuadTree,
    node: NodeId,
    particles: &[P],
    id: BodyId,
    position: Vec2,
    charge: f64,
    config: &LayoutConfig,
    rng: &mut StdRng,
    expansions: &mut usize,
) -> Vec2 {
    let quad = tree.node(node);

    if let Some(children) = quad.children {
        let size = (quad.bounds().width() + quad.bounds().height()) / 2.0;
        let distance = (quad.aggregate_center() - position).magnitude();
        // Strict inequality: a tie is far enough to approximate.
        if size / distance > config.theta {
            *expansions += 1;
            return children
                .into_iter()
                .map(|child| {
                    traverse(
                        tree, child, particles, id, position, charge, config, rng, expansions,
                    )
                })
                .sum();
        }
        return pair_force(
            position,
            charge,
            quad.aggregate_center(),
            quad.aggregate_charge(),
            config,
            rng,
        );
    }

    match quad.element() {
        // Self-interaction is excluded by identity.
        Some(other) if other == id => Vec2::ZERO,
        Some(other) => pair_force(
            position,
            charge,
            particles[other.index()].position(),
            particles[other.index()].charge(),
            config,
            rng,
        ),
        None => Vec2::ZERO,
    }
}

/// Force contributed by one interaction partner (a particle or a region
/// aggregate) on the particle at `position`.
///
/// The displacement points from the partner toward the particle, so a
/// positive charge product (like charges) pushes the particle away and a
/// negative product pulls it in. Pairs outside the configured distance range
/// contribute nothing.
fn pair_force(
    position: Vec2,
    charge: f64,
    other_position: Vec2,
    other_charge: f64,
    config: &LayoutConfig,
    rng: &mut StdRng,
) -> Vec2 {
    let mut displacement = position - other_position;
    if displacement.x.abs() < JIGGLE_EPSILON {
        displacement.x = jiggle(rng);
    }
    if displacement.y.abs() < JIGGLE_EPSILON {
        displacement.y = jiggle(rng);
    }

    let distance = displacement.magnitude();
    if distance < config.min_distance || distance > config.max_distance {
        return Vec2::ZERO;
    }

    let strength = charge * other_charge / (distance * distance);
    match displacement.normalized() {
        Some(direction) => direction * strength,
        None => Vec2::ZERO,
    }
}

/// Constant per-axis pull toward the clustering center. Direction-only: the
/// pull does not grow with distance, so remote particles are not yanked in
/// disproportionately hard. A non-finite center coordinate disables the axis.
fn centering_pull(position: Vec2, config: &LayoutConfig) -> Vec2 {
    let center = config.cluster_center;
    let strength = config.centering_strength;
    let mut pull = Vec2::ZERO;
    if center.x.is_finite() {
        if center.x > position.x {
            pull.x += strength;
        } else if center.x < position.x {
            pull.x -= strength;
        }
    }
    if center.y.is_finite() {
        if center.y > position.y {
            pull.y += strength;
        } else if center.y < position.y {
            pull.y -= strength;
        }
    }
    pull
}

/// Small random offset standing in for a degenerate near-zero displacement
/// component.
fn jiggle(rng: &mut StdRng) -> f64 {
    (rng.random::<f64>() - 0.5) * 1e-6
}

/// Seeds the jiggle source from the configured seed, the tick, and the body,
/// so results do not depend on thread scheduling.
fn jiggle_rng(seed: u64, tick: u64, id: BodyId) -> StdRng {
    let mix = seed
        .wrapping_add(tick.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(id.index() as u64);
    StdRng::seed_from_u64(mix)
}
