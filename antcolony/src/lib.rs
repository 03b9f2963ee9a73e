//! # antcolony
//!
//! An ant colony foraging simulation on a wrap-around map read from a bitmap.
//! Ants lay and follow two pheromone trails, carry food home and grow the colony.

pub mod bitmap;
pub mod config;
pub mod entities;
pub mod map;
pub mod movement;
pub mod pheromone;
pub mod render;
pub mod simulation;

mod replay;

pub use bitmap::DecodeError;
pub use config::SimConfig;
pub use entities::{Ant, Heading};
pub use render::Frame;
pub use simulation::{ColonyStats, Simulation, SimulationError};

use pyo3::prelude::*;

#[pymodule]
fn antcolony(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Simulation>()?;
    m.add_class::<ColonyStats>()?;
    Ok(())
}
