use super::Vec2;

/// An axis-aligned rectangular region in 2D space.
///
/// Containment is inclusive on the lower edges and exclusive on the upper
/// edges, so the four quadrants produced by [`Rect::quadrants`] partition the
/// parent exactly: every point of the parent lies in exactly one quadrant.
///
/// # Examples
///
/// ```
/// use force_layout::geometry::{Rect, Vec2};
///
/// let rect = Rect::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
/// assert!(rect.contains(Vec2::new(0.0, 0.0)));
/// assert!(rect.contains(Vec2::new(-1.0, 0.0))); // lower edge is inclusive
/// assert!(!rect.contains(Vec2::new(1.0, 0.0))); // upper edge is exclusive
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Rect { min, max }
    }

    /// Builds a rectangle from its center point and half-extent on each axis.
    pub fn from_center(center: Vec2, half_width: f64, half_height: f64) -> Self {
        Rect {
            min: Vec2::new(center.x - half_width, center.y - half_height),
            max: Vec2::new(center.x + half_width, center.y + half_height),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Half-open containment test: min edges inclusive, max edges exclusive.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
    }

    /// Splits the rectangle into its four equal quadrants, ordered
    /// north-west, north-east, south-west, south-east (y grows north).
    ///
    /// # Examples
    ///
    /// ```
    /// use force_layout::geometry::{Rect, Vec2};
    ///
    /// let rect = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
    /// let [nw, ne, sw, se] = rect.quadrants();
    ///
    /// assert_eq!(nw.center(), Vec2::new(0.5, 1.5));
    /// assert_eq!(ne.center(), Vec2::new(1.5, 1.5));
    /// assert_eq!(sw.center(), Vec2::new(0.5, 0.5));
    /// assert_eq!(se.center(), Vec2::new(1.5, 0.5));
    /// ```
    pub fn quadrants(&self) -> [Rect; 4] {
        let mid = self.center();
        [
            Rect::new(Vec2::new(self.min.x, mid.y), Vec2::new(mid.x, self.max.y)),
            Rect::new(mid, self.max),
            Rect::new(self.min, mid),
            Rect::new(Vec2::new(mid.x, self.min.y), Vec2::new(self.max.x, mid.y)),
        ]
    }
}
