use crate::map::wrap;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::Serialize;

/// One of the eight compass directions an ant can face, clockwise from north.
///
/// North is towards row 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Heading {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

const HEADINGS: [Heading; 8] = [
    Heading::North,
    Heading::NorthEast,
    Heading::East,
    Heading::SouthEast,
    Heading::South,
    Heading::SouthWest,
    Heading::West,
    Heading::NorthWest,
];

// (dx, dy) for each heading, indexed like `HEADINGS`
const OFFSETS: [(isize, isize); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

impl Heading {
    pub fn from_index(index: usize) -> Heading {
        HEADINGS[index % 8]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Rotates clockwise by `steps` eighths of a turn (negative is anticlockwise).
    pub fn rotate(self, steps: isize) -> Heading {
        HEADINGS[(self.index() as isize + steps).rem_euclid(8) as usize]
    }

    pub fn offset(self) -> (isize, isize) {
        OFFSETS[self.index()]
    }

    /// Top left corner of the square of side `size` an ant at (x, y) sees when facing this way.
    ///
    /// The square sits right in front of the ant: centred across the heading on a
    /// straight axis, and in the adjacent quadrant for diagonals.
    pub fn view_origin(self, x: isize, y: isize, size: usize) -> (isize, isize) {
        let (dx, dy) = self.offset();
        (
            view_start(x, dx, size as isize),
            view_start(y, dy, size as isize),
        )
    }
}

fn view_start(position: isize, direction: isize, size: isize) -> isize {
    match direction {
        1 => position + 1,
        -1 => position - size,
        _ => position - size / 2,
    }
}

impl Distribution<Heading> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Heading {
        HEADINGS[rng.gen_range(0..8)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ant {
    pub heading: Heading,
    pub carrying_food: bool,
    pub x: usize,
    pub y: usize,
}

impl Ant {
    pub fn new(heading: Heading, x: usize, y: usize) -> Ant {
        Ant {
            heading,
            carrying_food: false,
            x,
            y,
        }
    }

    /// The cell one step away in `heading`, wrapped onto the grid.
    pub fn destination(&self, heading: Heading, width: usize, height: usize) -> (usize, usize) {
        let (dx, dy) = heading.offset();
        (
            wrap(self.x as isize + dx, width),
            wrap(self.y as isize + dy, height),
        )
    }

    /// Turns to `heading` and takes one step that way.
    pub fn advance(&mut self, heading: Heading, width: usize, height: usize) {
        let (x, y) = self.destination(heading, width, height);
        self.heading = heading;
        self.x = x;
        self.y = y;
    }
}
