//! A distributed Conway's Game of Life: a grid is partitioned into tiles,
//! each tile driven by its own [`Worker`], and neighboring tiles exchange
//! border cells over TCP between generations.
//!
//! Direct callers drive a [`Worker`] through its handle (`cells`,
//! `wait_for_cells`); remote peers reach the same machinery over the
//! worker's three listening endpoints.

pub mod direction;
pub mod domain;
pub mod error;
pub mod net;
pub mod wiring;
pub mod worker;

pub use direction::Direction;
pub use domain::{presets, Grid, Pattern};
pub use error::{Error, Result};
pub use worker::Worker;
