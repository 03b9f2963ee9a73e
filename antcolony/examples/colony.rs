use antcolony::map::palette;
use antcolony::{bitmap, SimConfig, Simulation};
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs, thread};
use tracing_subscriber::EnvFilter;

/// A 60x30 map: home on the left, two food patches and a wall in between.
fn demo_map() -> Vec<u8> {
    let (width, height) = (60, 30);
    let mut pixels = vec![palette::BACKGROUND; width * height];

    for y in 5..25 {
        pixels[y * width + 30] = palette::WALL;
    }
    for y in 3..7 {
        for x in 45..50 {
            pixels[y * width + x] = palette::FOOD;
        }
    }
    for y in 22..27 {
        for x in 40..44 {
            pixels[y * width + x] = palette::FOOD;
        }
    }
    pixels[15 * width + 10] = palette::HOME;

    bitmap::encode(width, height, &pixels)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Usage: colony [map.bmp] [ticks]
    let mut args = env::args().skip(1);
    let image = match args.next() {
        Some(path) => match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => panic!("Error reading map file {}: {}", path, e),
        },
        None => demo_map(),
    };
    let ticks: u64 = args.next().and_then(|t| t.parse().ok()).unwrap_or(2000);

    let output = env::temp_dir();
    let config = SimConfig {
        seed: Some(0),
        diffusion_interval: 100,
        replay_filename: Some(output.join("colony_replay.json").to_string_lossy().to_string()),
        ..SimConfig::with_population(300, 30)
    };
    let tick_interval = Duration::from_millis(config.tick_interval_ms);

    let mut simulation = match Simulation::new(&image, config) {
        Ok(simulation) => simulation,
        Err(e) => panic!("Could not start the simulation: {}", e),
    };

    for _ in 0..ticks {
        if let Err(e) = simulation.advance_tick() {
            eprintln!("Simulation halted: {}", e);
            break;
        }
        if simulation.tick() % 10 == 0 {
            simulation.draw().expect("failed to draw to the terminal");
            thread::sleep(tick_interval);
        }
    }

    let frame_path: PathBuf = output.join("colony_frame.bmp");
    fs::write(&frame_path, simulation.render_frame().to_bitmap()).expect("failed to save frame");
    simulation.save_replay().expect("failed to save replay");

    println!("\nFinal state: {:?}", simulation.stats());
    println!("Last frame written to {}", frame_path.display());
}
