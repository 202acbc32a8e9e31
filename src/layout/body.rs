use crate::geometry::Vec2;
use crate::quadtree::{BodyId, Charged};

/// The host contract for a particle taking part in the layout.
///
/// The simulation reads the position and signed charge and delivers one
/// accumulated force per tick through [`Body::apply_force`]. Integrating that
/// force into motion (velocity, damping, collision response) and keeping the
/// particle inside the declared simulation bounds is entirely the host's
/// responsibility; the simulation never moves a particle itself.
pub trait Body: Charged {
    /// Receives the net force accumulated for this particle during one tick.
    fn apply_force(&mut self, force: Vec2);
}

/// Per-particle bookkeeping owned by the simulation: the particle's stable
/// identity and its accumulated-force vector.
///
/// One wrapper is created per particle at simulation construction and lives
/// for the simulation's lifetime. The force vector is fully overwritten every
/// tick.
#[derive(Debug, Clone)]
pub struct ForceBodyNode {
    id: BodyId,
    force: Vec2,
}

impl ForceBodyNode {
    pub(crate) fn new(id: BodyId) -> Self {
        ForceBodyNode {
            id,
            force: Vec2::ZERO,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    /// The force accumulated during the most recent tick.
    pub fn force(&self) -> Vec2 {
        self.force
    }

    pub(crate) fn set_force(&mut self, force: Vec2) {
        self.force = force;
    }
}

/// A minimal self-contained [`Body`] implementation, useful for tests,
/// benchmarks, and hosts without their own particle type. Applying a force
/// displaces the point directly by the force vector.
///
/// # Examples
///
/// ```
/// use force_layout::geometry::Vec2;
/// use force_layout::layout::{Body, PointBody};
/// use force_layout::quadtree::Charged;
///
/// let mut body = PointBody::new(Vec2::new(1.0, 1.0), -2.0);
/// assert_eq!(body.charge(), -2.0);
///
/// body.apply_force(Vec2::new(0.5, 0.0));
/// assert_eq!(body.position(), Vec2::new(1.5, 1.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PointBody {
    pub position: Vec2,
    pub charge: f64,
}

impl PointBody {
    pub fn new(position: Vec2, charge: f64) -> Self {
        PointBody { position, charge }
    }
}

impl Charged for PointBody {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn charge(&self) -> f64 {
        self.charge
    }
}

impl Body for PointBody {
    fn apply_force(&mut self, force: Vec2) {
        self.position += force;
    }
}
