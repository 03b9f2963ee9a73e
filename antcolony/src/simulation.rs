use crate::bitmap::{self, DecodeError};
use crate::config::SimConfig;
use crate::entities::{Ant, Heading};
use crate::map::Map;
use crate::movement;
use crate::pheromone::{Field, Trail};
use crate::render::{self, Frame};
use crate::replay::{create_replay_logger, ReplayLogger, TickStats};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid map: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("ant {agent} at ({x}, {y}) has nowhere to go")]
    NoValidHeading { agent: usize, x: usize, y: usize },
    #[error("ant {agent} at ({x}, {y}) computed a zero weight towards {heading:?}")]
    ZeroWeight {
        agent: usize,
        x: usize,
        y: usize,
        heading: Heading,
    },
}

impl From<SimulationError> for PyErr {
    fn from(error: SimulationError) -> PyErr {
        match error {
            SimulationError::Decode(_) | SimulationError::InvalidConfig(_) => {
                PyValueError::new_err(error.to_string())
            }
            _ => PyRuntimeError::new_err(error.to_string()),
        }
    }
}

/// The ant colony simulation.
/// Main entry point for running it: advance it tick by tick and render frames in between.
#[pyclass(module = "antcolony")]
pub struct Simulation {
    map: Map,
    field: Field,
    ants: Vec<Ant>,
    config: SimConfig,
    tick: u64,
    deliveries: usize,
    replay_logger: Box<dyn ReplayLogger>,
    rng: StdRng,
}

/// A summary of the colony at some tick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[pyclass(module = "antcolony", get_all)]
pub struct ColonyStats {
    /// Ticks simulated so far.
    pub tick: u64,
    /// Live ants.
    pub population: usize,
    /// The most ants the colony can grow to.
    pub max_population: usize,
    /// Live ants currently carrying food home.
    pub carrying_food: usize,
    /// Food cells still on the map.
    pub food_remaining: usize,
    /// Food brought home so far.
    pub deliveries: usize,
}

impl Simulation {
    /// Creates a simulation from the bytes of a bitmap map.
    ///
    /// `config.initial_ants` ants start on the home cell, facing every direction in turn.
    pub fn new(image: &[u8], config: SimConfig) -> Result<Simulation, SimulationError> {
        config.validate().map_err(SimulationError::InvalidConfig)?;

        let bitmap = bitmap::decode(image)?;
        let map = Map::from_bitmap(bitmap);
        let (width, height) = (map.width(), map.height());
        let (home_x, home_y) = map.home();

        // The colony grows on demand; max_ants is only a cap
        let mut ants = Vec::new();
        ants.try_reserve_exact(config.initial_ants).map_err(|_| {
            SimulationError::InvalidConfig(format!(
                "cannot allocate {} initial ants",
                config.initial_ants
            ))
        })?;
        ants.extend(
            (0..config.initial_ants).map(|i| Ant::new(Heading::from_index(i), home_x, home_y)),
        );

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let replay_logger = create_replay_logger(
            config.replay_filename.clone(),
            width,
            height,
            map.home(),
            config.clone(),
        );

        info!(
            width,
            height,
            home_x,
            home_y,
            ants = ants.len(),
            max_ants = config.max_ants,
            food = map.food_remaining(),
            "simulation created"
        );

        Ok(Simulation {
            map,
            field: Field::new(width, height),
            ants,
            config,
            tick: 0,
            deliveries: 0,
            replay_logger,
            rng,
        })
    }

    /// Advances the simulation by one tick.
    ///
    /// Every ant that was alive when the tick started lays pheromone and moves, in
    /// order. Ants born during the tick first move on the next one. Every
    /// `diffusion_interval` ticks the pheromone field is blurred.
    ///
    /// An error means the map broke an invariant (e.g. an ant got walled in) and the
    /// simulation must not be advanced any further.
    pub fn advance_tick(&mut self) -> Result<(), SimulationError> {
        self.tick += 1;

        let live = self.ants.len();
        for index in 0..live {
            self.step_ant(index)?;
        }

        if self.tick % self.config.diffusion_interval == 0 {
            self.field
                .blur(self.config.blur_radius, self.config.reduction_factor);
            self.replay_logger.log_diffuse(self.tick);
            debug!(tick = self.tick, "pheromones diffused");
        }

        if self.replay_logger.is_recording() {
            let stats = self.tick_stats();
            self.replay_logger.log_tick(self.tick, stats);
        }

        Ok(())
    }

    /// Renders the current state. Doesn't change the simulation.
    pub fn render_frame(&self) -> Frame {
        render::compose(&self.map, &self.field, &self.ants)
    }

    /// Renders the current state to the terminal.
    pub fn draw(&self) -> io::Result<()> {
        render::draw(&self.render_frame(), &self.stats())
    }

    pub fn save_replay(&self) -> io::Result<()> {
        self.replay_logger.save()
    }

    pub fn stats(&self) -> ColonyStats {
        let stats = self.tick_stats();
        ColonyStats {
            tick: self.tick,
            population: stats.population,
            max_population: self.config.max_ants,
            carrying_food: stats.carrying_food,
            food_remaining: stats.food_remaining,
            deliveries: stats.deliveries,
        }
    }

    pub fn width(&self) -> usize {
        self.map.width()
    }

    pub fn height(&self) -> usize {
        self.map.height()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Ticks left until the next blur pass.
    pub fn ticks_until_diffusion(&self) -> u64 {
        self.config.diffusion_interval - self.tick % self.config.diffusion_interval
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn step_ant(&mut self, index: usize) -> Result<(), SimulationError> {
        let mut ant = self.ants[index];

        self.field.deposit(
            ant.x,
            ant.y,
            Trail::laid(ant.carrying_food),
            self.config.deposit_amount,
        );

        let heading = movement::choose_heading(
            index,
            &ant,
            &self.map,
            &self.field,
            &self.config,
            &mut self.rng,
        )?;
        ant.advance(heading, self.map.width(), self.map.height());
        self.ants[index] = ant;

        self.arrive(index);
        Ok(())
    }

    /// Applies what happens when the ant at `index` lands on its current cell.
    fn arrive(&mut self, index: usize) {
        let ant = &mut self.ants[index];
        let location = (ant.x, ant.y);

        if !ant.carrying_food && self.map.consume_food_at(ant.x, ant.y) {
            ant.carrying_food = true;
            self.replay_logger.log_pick_up(self.tick, index, location);
            return;
        }

        if ant.carrying_food && self.map.is_home(ant.x, ant.y) {
            ant.carrying_food = false;
            self.deliveries += 1;
            self.replay_logger.log_deliver(self.tick, index, location);
            self.spawn_ant(location);
        }
    }

    fn spawn_ant(&mut self, (x, y): (usize, usize)) {
        if self.ants.len() >= self.config.max_ants {
            return;
        }

        let heading: Heading = self.rng.gen();
        self.ants.push(Ant::new(heading, x, y));

        let id = self.ants.len() - 1;
        self.replay_logger.log_spawn(self.tick, id, (x, y), heading);
        debug!(tick = self.tick, population = self.ants.len(), "colony grew");
    }

    fn tick_stats(&self) -> TickStats {
        TickStats {
            population: self.ants.len(),
            carrying_food: self.ants.iter().filter(|ant| ant.carrying_food).count(),
            food_remaining: self.map.food_remaining(),
            deliveries: self.deliveries,
        }
    }
}

#[pymethods]
impl Simulation {
    /// Creates a new simulation.
    ///
    /// # Arguments
    /// * `image` - The bytes of a 24-bit uncompressed bitmap describing the map.
    /// * `max_ants` - The most ants the colony can grow to.
    /// * `initial_ants` - The ants spawned on the home cell at the start.
    /// * `seed` - The seed for the random number generator. If `None`, a random seed is used.
    /// * `replay_filename` - The filename to save the replay to. If `None`, no replay will be saved.
    #[new]
    #[pyo3(signature = (image, max_ants=5000, initial_ants=500, seed=None, replay_filename=None))]
    fn py_new(
        image: &[u8],
        max_ants: usize,
        initial_ants: usize,
        seed: Option<u64>,
        replay_filename: Option<String>,
    ) -> PyResult<Simulation> {
        let config = SimConfig {
            seed,
            replay_filename,
            ..SimConfig::with_population(max_ants, initial_ants)
        };
        Ok(Simulation::new(image, config)?)
    }

    /// Advances the simulation by one tick.
    #[pyo3(name = "advance_tick")]
    fn py_advance_tick(&mut self) -> PyResult<()> {
        Ok(self.advance_tick()?)
    }

    /// Renders the simulation as `width * height * 3` bytes of RGB, top row first.
    #[pyo3(name = "render_frame")]
    fn py_render_frame<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, &self.render_frame().pixels)
    }

    /// Returns a summary of the colony.
    #[pyo3(name = "stats")]
    fn py_stats(&self) -> ColonyStats {
        self.stats()
    }

    /// Draws the simulation to the console.
    #[pyo3(name = "draw")]
    fn py_draw(&self) -> PyResult<()> {
        Ok(self.draw()?)
    }

    /// Writes the replay file, if one was requested.
    #[pyo3(name = "save_replay")]
    fn py_save_replay(&self) -> PyResult<()> {
        Ok(self.save_replay()?)
    }

    #[getter(width)]
    fn py_width(&self) -> usize {
        self.width()
    }

    #[getter(height)]
    fn py_height(&self) -> usize {
        self.height()
    }
}
