mod vec2;
mod rect;

pub use vec2::*;
pub use rect::*;
