use serde::{Deserialize, Serialize};

/// Tunables for a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Upper bound on the colony size.
    pub max_ants: usize,
    /// Ants spawned on the home cell when the simulation is created.
    pub initial_ants: usize,

    // Pheromones
    /// Ticks between two blur passes over the pheromone field.
    pub diffusion_interval: u64,
    pub blur_radius: usize,
    /// Extra divisor applied by each blur pass. Above 1 so trails fade.
    pub reduction_factor: f64,
    /// Pheromone an ant leaves on its cell every tick.
    pub deposit_amount: u8,

    // Movement
    /// Side of the square each ant samples ahead of every candidate heading.
    pub view_radius: usize,
    /// Multiplier on the weight of carrying straight on.
    pub forward_bias: u64,
    /// Weight every open heading gets regardless of pheromones.
    pub base_weight: u64,

    /// Pause a driver should leave between ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Seed for the random number generator. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Where to write the replay of the run. `None` disables the replay.
    pub replay_filename: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_ants: 5000,
            initial_ants: 500,
            diffusion_interval: 1000,
            blur_radius: 1,
            reduction_factor: 1.1,
            deposit_amount: 3,
            view_radius: 2,
            forward_bias: 4, // 4x more likely to go in a straight line
            base_weight: 1,
            tick_interval_ms: 50,
            seed: None,
            replay_filename: None,
        }
    }
}

impl SimConfig {
    pub fn with_population(max_ants: usize, initial_ants: usize) -> Self {
        Self {
            max_ants,
            initial_ants,
            ..Self::default()
        }
    }

    /// Checks the values make sense together, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_ants == 0 {
            return Err("initial_ants must be at least 1".to_string());
        }

        if self.initial_ants > self.max_ants {
            return Err(format!(
                "initial_ants ({}) cannot exceed max_ants ({})",
                self.initial_ants, self.max_ants
            ));
        }

        if self.diffusion_interval == 0 {
            return Err("diffusion_interval must be at least 1".to_string());
        }

        if self.reduction_factor.is_nan() || self.reduction_factor <= 1.0 {
            return Err(format!(
                "reduction_factor must be greater than 1 (got {})",
                self.reduction_factor
            ));
        }

        if self.view_radius == 0 {
            return Err("view_radius must be at least 1".to_string());
        }

        // Either being zero would leave an open heading unreachable
        if self.forward_bias == 0 {
            return Err("forward_bias must be at least 1".to_string());
        }

        if self.base_weight == 0 {
            return Err("base_weight must be at least 1".to_string());
        }

        Ok(())
    }
}
