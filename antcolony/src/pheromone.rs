use crate::map::wrap;

/// The two scent channels ants lay and follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trail {
    /// Laid by ants carrying food, followed by ants looking for it.
    Food,
    /// Laid by ants looking for food, followed by ants carrying it back.
    Home,
}

impl Trail {
    /// The trail an ant leaves behind in the given state.
    pub fn laid(carrying_food: bool) -> Trail {
        match carrying_food {
            true => Trail::Food,
            false => Trail::Home,
        }
    }

    /// The trail an ant steers by in the given state.
    pub fn followed(carrying_food: bool) -> Trail {
        match carrying_food {
            true => Trail::Home,
            false => Trail::Food,
        }
    }
}

/// Per-cell pheromone intensities over the (toroidal) map grid.
pub struct Field {
    width: usize,
    height: usize,
    food: Vec<u8>,
    home: Vec<u8>,
}

impl Field {
    pub fn new(width: usize, height: usize) -> Field {
        Field {
            width,
            height,
            food: vec![0; width * height],
            home: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize, trail: Trail) -> u8 {
        self.channel(trail)[y * self.width + x]
    }

    /// Adds `amount` to a cell, saturating at 255.
    pub fn deposit(&mut self, x: usize, y: usize, trail: Trail, amount: u8) {
        let index = y * self.width + x;
        let cell = &mut self.channel_mut(trail)[index];
        *cell = cell.saturating_add(amount);
    }

    /// Sums a trail over a rectangle whose top left corner may lie off the grid.
    pub fn weighted_sum(
        &self,
        left: isize,
        top: isize,
        view_width: usize,
        view_height: usize,
        trail: Trail,
    ) -> u64 {
        let data = self.channel(trail);
        let mut total = 0u64;

        for dy in 0..view_height as isize {
            let y = wrap(top + dy, self.height);
            for dx in 0..view_width as isize {
                let x = wrap(left + dx, self.width);
                total += data[y * self.width + x] as u64;
            }
        }

        total
    }

    /// Spreads and fades both trails with a wrapping box blur.
    ///
    /// The horizontal pass averages `2 * radius + 1` neighbours, the vertical pass
    /// additionally divides by `reduction_factor`, so a uniform field of `v`
    /// becomes `floor(v / reduction_factor)`.
    pub fn blur(&mut self, radius: usize, reduction_factor: f64) {
        let (width, height) = (self.width, self.height);
        let mut scratch = vec![0u8; width * height];

        for data in [&mut self.food, &mut self.home] {
            blur_channel(data, &mut scratch, width, height, radius, reduction_factor);
        }
    }

    fn channel(&self, trail: Trail) -> &[u8] {
        match trail {
            Trail::Food => &self.food,
            Trail::Home => &self.home,
        }
    }

    fn channel_mut(&mut self, trail: Trail) -> &mut [u8] {
        match trail {
            Trail::Food => &mut self.food,
            Trail::Home => &mut self.home,
        }
    }
}

fn blur_channel(
    data: &mut [u8],
    scratch: &mut [u8],
    width: usize,
    height: usize,
    radius: usize,
    reduction_factor: f64,
) {
    let span = 2 * radius as isize + 1;
    let divisor = span as f64 * reduction_factor;

    for y in 0..height {
        for x in 0..width {
            let total: u32 = (-(radius as isize)..=radius as isize)
                .map(|dx| data[y * width + wrap(x as isize + dx, width)] as u32)
                .sum();
            scratch[y * width + x] = (total / span as u32) as u8;
        }
    }

    for x in 0..width {
        for y in 0..height {
            let total: u32 = (-(radius as isize)..=radius as isize)
                .map(|dy| scratch[wrap(y as isize + dy, height) * width + x] as u32)
                .sum();
            data[y * width + x] = (total as f64 / divisor) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: usize, height: usize, value: u8) -> Field {
        let mut field = Field::new(width, height);
        field.food.fill(value);
        field.home.fill(value);
        field
    }

    #[test]
    fn when_choosing_trails_ants_follow_the_one_they_do_not_lay() {
        assert_eq!(Trail::laid(false), Trail::Home);
        assert_eq!(Trail::followed(false), Trail::Food);
        assert_eq!(Trail::laid(true), Trail::Food);
        assert_eq!(Trail::followed(true), Trail::Home);
    }

    #[test]
    fn when_depositing_only_the_chosen_trail_changes() {
        let mut field = Field::new(4, 3);
        field.deposit(2, 1, Trail::Food, 3);
        field.deposit(2, 1, Trail::Food, 3);

        assert_eq!(field.get(2, 1, Trail::Food), 6);
        assert_eq!(field.get(2, 1, Trail::Home), 0);
        assert_eq!(field.get(1, 2, Trail::Food), 0);
    }

    #[test]
    fn when_depositing_on_a_saturated_cell_it_stays_at_255() {
        let mut field = Field::new(2, 2);
        field.deposit(0, 0, Trail::Home, 250);
        field.deposit(0, 0, Trail::Home, 3);
        assert_eq!(field.get(0, 0, Trail::Home), 253);

        for _ in 0..10 {
            field.deposit(0, 0, Trail::Home, 3);
        }
        assert_eq!(field.get(0, 0, Trail::Home), 255);

        field.deposit(0, 0, Trail::Home, u8::MAX);
        assert_eq!(field.get(0, 0, Trail::Home), 255);
    }

    #[test]
    fn when_summing_a_window_it_wraps_around_every_edge() {
        let mut field = Field::new(5, 4);
        field.deposit(4, 3, Trail::Food, 10);
        field.deposit(0, 0, Trail::Food, 20);
        field.deposit(4, 0, Trail::Food, 40);
        field.deposit(0, 3, Trail::Food, 80);
        field.deposit(2, 2, Trail::Food, 160);

        // A 2x2 window centred on the corner covers all four corners
        assert_eq!(field.weighted_sum(-1, -1, 2, 2, Trail::Food), 150);
        assert_eq!(field.weighted_sum(4, 3, 2, 2, Trail::Food), 150);
        assert_eq!(field.weighted_sum(0, 0, 5, 4, Trail::Food), 310);
        assert_eq!(field.weighted_sum(0, 0, 5, 4, Trail::Home), 0);
    }

    #[test]
    fn when_blurring_a_uniform_field_it_decays_evenly_without_edge_artifacts() {
        let mut field = uniform(7, 5, 200);
        field.blur(1, 1.1);

        assert!(field.food.iter().all(|&value| value == 181));
        assert!(field.home.iter().all(|&value| value == 181));

        let mut field = uniform(6, 6, 255);
        field.blur(2, 1.1);
        assert!(field.food.iter().all(|&value| value == 231));
    }

    #[test]
    fn when_blurring_a_single_spike_it_spreads_into_a_wrapped_square() {
        let mut field = Field::new(9, 9);
        field.deposit(0, 0, Trail::Food, 90);
        field.blur(1, 1.0);

        for y in 0..9 {
            for x in 0..9 {
                let expected = match (x, y) {
                    (0 | 1 | 8, 0 | 1 | 8) => 10,
                    _ => 0,
                };
                assert_eq!(field.get(x, y, Trail::Food), expected, "cell ({x}, {y})");
            }
        }
        assert!(field.home.iter().all(|&value| value == 0));
    }

    #[test]
    fn when_blurring_repeatedly_the_field_fades_out() {
        let mut field = uniform(4, 4, 255);
        for _ in 0..100 {
            field.blur(1, 1.1);
        }
        assert!(field.food.iter().all(|&value| value == 0));
    }
}
