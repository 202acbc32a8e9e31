mod body;
mod config;
mod simulation;

pub use body::*;
pub use config::*;
pub use simulation::*;
