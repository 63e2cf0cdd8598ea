mod grid;
mod patterns;

pub use grid::Grid;
pub use patterns::{presets, Pattern};
