use std::error::Error;
use std::fmt;

/// Represents errors that can occur while maintaining the layout tree or
/// configuring a simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A position fell outside the bounds of the region it was inserted into.
    /// The tree is left unchanged when this is reported.
    OutOfBounds { x: f64, y: f64 },
    /// Indicates an invalid theta value (must be finite and greater than zero).
    InvalidTheta,
    /// Indicates an invalid interaction range (negative minimum, or a minimum
    /// larger than the maximum).
    InvalidDistanceRange,
    /// Indicates degenerate simulation bounds (zero or negative extent).
    InvalidBounds,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LayoutError::OutOfBounds { x, y } => {
                write!(f, "Position ({}, {}) is outside the region bounds", x, y)
            }
            LayoutError::InvalidTheta => write!(f, "Theta must be finite and greater than zero"),
            LayoutError::InvalidDistanceRange => write!(f, "Invalid interaction distance range"),
            LayoutError::InvalidBounds => write!(f, "Simulation bounds must have positive extent"),
        }
    }
}

impl Error for LayoutError {}
