use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 2D point or displacement vector with `f64` components.
///
/// The same type serves as both a position and a displacement; subtracting
/// two positions yields the displacement between them. All operations are
/// pure value operations with no side effects.
///
/// # Examples
///
/// ```
/// use force_layout::geometry::Vec2;
///
/// let a = Vec2::new(3.0, 4.0);
/// let b = Vec2::new(1.0, 1.0);
///
/// let d = a - b;
/// assert_eq!(d, Vec2::new(2.0, 3.0));
/// assert!((a.magnitude() - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// Euclidean length of the vector.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Squared length, avoiding the square root where only comparison is needed.
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Returns the unit vector in this direction, or `None` when the
    /// magnitude is exactly zero and no direction exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use force_layout::geometry::Vec2;
    ///
    /// let v = Vec2::new(0.0, 2.0);
    /// assert_eq!(v.normalized(), Some(Vec2::new(0.0, 1.0)));
    /// assert_eq!(Vec2::ZERO.normalized(), None);
    /// ```
    pub fn normalized(&self) -> Option<Vec2> {
        let mag = self.magnitude();
        if mag == 0.0 {
            None
        } else {
            Some(Vec2::new(self.x / mag, self.y / mag))
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Sum for Vec2 {
    fn sum<I: Iterator<Item = Vec2>>(iter: I) -> Vec2 {
        iter.fold(Vec2::ZERO, |acc, v| acc + v)
    }
}
