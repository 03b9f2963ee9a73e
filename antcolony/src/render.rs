use crate::bitmap;
use crate::entities::Ant;
use crate::map::palette::{self, Rgb};
use crate::map::{Cell, Map};
use crate::pheromone::{Field, Trail};
use crate::simulation::ColonyStats;
use crossterm::{
    cursor::{Hide, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, stdout, Write};

/// A rendered view of the simulation, row-major RGB with row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    /// `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let at = 3 * (y * self.width + x);
        [self.pixels[at], self.pixels[at + 1], self.pixels[at + 2]]
    }

    /// Encodes the frame as a 24-bit bitmap file.
    pub fn to_bitmap(&self) -> Vec<u8> {
        let pixels: Vec<Rgb> = self
            .pixels
            .chunks_exact(3)
            .map(|rgb| [rgb[0], rgb[1], rgb[2]])
            .collect();
        bitmap::encode(self.width, self.height, &pixels)
    }
}

/// Composes the terrain, the pheromone field and the live ants into a frame.
///
/// Food trail shows on the red channel and home trail on the green one, each
/// blended over the terrain with its own intensity as opacity. Walls are never
/// tinted and ants are painted on top of everything.
pub fn compose(map: &Map, field: &Field, ants: &[Ant]) -> Frame {
    let (width, height) = (map.width(), map.height());
    let mut pixels = Vec::with_capacity(width * height * 3);

    for y in 0..height {
        for x in 0..width {
            if map.cell(x, y) == Cell::Wall {
                pixels.extend_from_slice(&palette::WALL);
                continue;
            }

            let scent = [
                field.get(x, y, Trail::Food),
                field.get(x, y, Trail::Home),
                0,
            ];
            let background = map.background(x, y);
            for (p, bg) in scent.into_iter().zip(background) {
                pixels.push(blend(p, bg));
            }
        }
    }

    for ant in ants {
        let at = 3 * (ant.y * width + ant.x);
        pixels[at..at + 3].copy_from_slice(&palette::ANT);
    }

    Frame {
        width,
        height,
        pixels,
    }
}

fn blend(intensity: u8, background: u8) -> u8 {
    let (p, bg) = (intensity as u32, background as u32);
    (p + bg * (255 - p) / 255) as u8
}

/// Paints a frame to the terminal, two columns per cell.
pub fn draw(frame: &Frame, stats: &ColonyStats) -> io::Result<()> {
    let mut stdout = stdout();

    // Display information about the colony
    execute!(
        stdout,
        Clear(ClearType::All),
        MoveTo(0, 0),
        Hide,
        Print("Tick: "),
        Print(stats.tick.to_string()),
        Print("\nAnts: "),
        Print(format!("{}/{}", stats.population, stats.max_population)),
        Print(", Carrying food = "),
        Print(stats.carrying_food.to_string()),
        Print(", Delivered = "),
        Print(stats.deliveries.to_string()),
        Print(", Food left = "),
        Print(stats.food_remaining.to_string()),
        Print("\n\n")
    )?;

    // Display the map
    for y in 0..frame.height {
        for x in 0..frame.width {
            let [r, g, b] = frame.pixel(x, y);
            queue!(stdout, SetBackgroundColor(Color::Rgb { r, g, b }), Print("  "))?;
        }
        queue!(stdout, ResetColor, Print("\n"))?;
    }

    stdout.flush()
}
