use crate::bitmap::Bitmap;

pub mod palette {
    pub type Rgb = [u8; 3];

    pub const WALL: Rgb = [150, 95, 57];
    pub const HOME: Rgb = [105, 255, 105];
    pub const FOOD: Rgb = [235, 52, 186];
    /// Only ever drawn on top of a frame, never read from a map.
    pub const ANT: Rgb = [72, 161, 233];
    /// Colour left behind once food has been picked up.
    pub const BACKGROUND: Rgb = [176, 135, 107];
}

use palette::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Food,
    Home,
    Background,
}

impl Cell {
    pub fn classify(color: Rgb) -> Cell {
        match color {
            palette::WALL => Cell::Wall,
            palette::FOOD => Cell::Food,
            palette::HOME => Cell::Home,
            _ => Cell::Background,
        }
    }
}

/// Wraps a possibly out of range coordinate onto a toroidal axis of length `bound`.
pub fn wrap(value: isize, bound: usize) -> usize {
    value.rem_euclid(bound as isize) as usize
}

/// The terrain of the simulation: what each cell is and what colour it shows.
pub struct Map {
    width: usize,
    height: usize,
    home: (usize, usize),
    cells: Vec<Cell>,
    colors: Vec<Rgb>,
    food_remaining: usize,
}

impl Map {
    pub fn from_bitmap(bitmap: Bitmap) -> Map {
        let cells: Vec<Cell> = bitmap.pixels.iter().map(|&color| Cell::classify(color)).collect();
        let food_remaining = cells.iter().filter(|&&cell| cell == Cell::Food).count();

        Map {
            width: bitmap.width,
            height: bitmap.height,
            home: bitmap.home,
            cells,
            colors: bitmap.pixels,
            food_remaining,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn home(&self) -> (usize, usize) {
        self.home
    }

    pub fn food_remaining(&self) -> usize {
        self.food_remaining
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.width + x]
    }

    /// Same as [`Map::cell`] but for coordinates that may fall off the grid.
    pub fn cell_wrapped(&self, x: isize, y: isize) -> Cell {
        self.cell(wrap(x, self.width), wrap(y, self.height))
    }

    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.cell(x, y) == Cell::Wall
    }

    pub fn is_food(&self, x: usize, y: usize) -> bool {
        self.cell(x, y) == Cell::Food
    }

    pub fn is_home(&self, x: usize, y: usize) -> bool {
        self.cell(x, y) == Cell::Home
    }

    /// The colour a cell shows underneath pheromones and ants.
    pub fn background(&self, x: usize, y: usize) -> Rgb {
        self.colors[y * self.width + x]
    }

    /// Turns a food cell into plain background. Returns whether there was food to take.
    pub fn consume_food_at(&mut self, x: usize, y: usize) -> bool {
        let index = y * self.width + x;
        if self.cells[index] != Cell::Food {
            return false;
        }

        self.cells[index] = Cell::Background;
        self.colors[index] = palette::BACKGROUND;
        self.food_remaining -= 1;
        true
    }
}

/// Builds bitmap bytes from ASCII rows: `.` background, `#` wall, `H` home, `F` food.
#[cfg(test)]
pub(crate) fn sketch(rows: &[&str]) -> Vec<u8> {
    let width = rows[0].len();
    let pixels: Vec<Rgb> = rows
        .iter()
        .flat_map(|row| row.chars())
        .map(|value| match value {
            '.' => palette::BACKGROUND,
            '#' => palette::WALL,
            'H' => palette::HOME,
            'F' => palette::FOOD,
            _ => panic!("Invalid map character: {}", value),
        })
        .collect();

    crate::bitmap::encode(width, rows.len(), &pixels)
}
