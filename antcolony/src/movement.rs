use crate::config::SimConfig;
use crate::entities::{Ant, Heading};
use crate::map::{Cell, Map};
use crate::pheromone::{Field, Trail};
use crate::simulation::SimulationError;
use rand::Rng;

/// Index of the straight-ahead slot, the one `forward_bias` applies to.
const STRAIGHT: usize = 1;

/// Whether an ant may step one cell in `heading`.
///
/// Walls always block. Ants already carrying food also keep off food cells.
pub fn is_open(map: &Map, ant: &Ant, heading: Heading) -> bool {
    let (x, y) = ant.destination(heading, map.width(), map.height());
    match map.cell(x, y) {
        Cell::Wall => false,
        Cell::Food => !ant.carrying_food,
        Cell::Home | Cell::Background => true,
    }
}

/// The headings considered for the right-turn, straight and left-turn slots.
///
/// A blocked turn is swapped for the heading opposite to it. A slot is `None`
/// when both are blocked.
pub fn candidates(map: &Map, ant: &Ant) -> [Option<Heading>; 3] {
    [1, 0, -1].map(|turn| {
        let preferred = ant.heading.rotate(turn);
        let fallback = preferred.rotate(4);
        [preferred, fallback]
            .into_iter()
            .find(|&heading| is_open(map, ant, heading))
    })
}

/// How attractive `heading` is: the base weight plus the pheromone the ant follows
/// inside its view window for that heading.
pub fn weigh(field: &Field, ant: &Ant, heading: Heading, config: &SimConfig) -> u64 {
    let size = config.view_radius;
    let (left, top) = heading.view_origin(ant.x as isize, ant.y as isize, size);
    let scent = field.weighted_sum(left, top, size, size, Trail::followed(ant.carrying_food));
    config.base_weight + scent
}

/// Picks an index with probability proportional to its weight.
///
/// Returns `None` if every weight is zero.
pub fn weighted_choice<R: Rng + ?Sized>(weights: &[u64], rng: &mut R) -> Option<usize> {
    let total: u64 = weights.iter().sum();
    if total == 0 {
        return None;
    }

    let mut remaining = rng.gen_range(1..=total);
    for (index, &weight) in weights.iter().enumerate() {
        if remaining <= weight {
            return Some(index);
        }
        remaining -= weight;
    }

    None
}

/// Chooses the heading the ant at `index` moves in this tick.
pub fn choose_heading<R: Rng + ?Sized>(
    index: usize,
    ant: &Ant,
    map: &Map,
    field: &Field,
    config: &SimConfig,
    rng: &mut R,
) -> Result<Heading, SimulationError> {
    let slots = candidates(map, ant);

    let mut weights = [0u64; 3];
    for (slot, candidate) in slots.iter().enumerate() {
        let Some(heading) = *candidate else {
            continue;
        };

        let weight = weigh(field, ant, heading, config);
        if weight == 0 {
            return Err(SimulationError::ZeroWeight {
                agent: index,
                x: ant.x,
                y: ant.y,
                heading,
            });
        }

        weights[slot] = match slot {
            STRAIGHT => weight * config.forward_bias,
            _ => weight,
        };
    }

    weighted_choice(&weights, rng)
        .and_then(|slot| slots[slot])
        .ok_or(SimulationError::NoValidHeading {
            agent: index,
            x: ant.x,
            y: ant.y,
        })
}
