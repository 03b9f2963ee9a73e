use crate::config::SimConfig;
use crate::entities::Heading;
use serde_json::json;
use std::{collections::HashMap, fs::File, io, io::BufWriter};

pub fn create_replay_logger(
    filename: Option<String>,
    map_width: usize,
    map_height: usize,
    home: (usize, usize),
    config: SimConfig,
) -> Box<dyn ReplayLogger> {
    match filename {
        None => Box::new(NoOpReplayLogger {}),
        Some(filename) => Box::new(JsonReplayLogger::new(
            filename, map_width, map_height, home, config,
        )),
    }
}

pub trait ReplayLogger: Send + Sync {
    /// Whether anything logged will end up in a replay.
    fn is_recording(&self) -> bool {
        false
    }

    #[allow(unused_variables)]
    fn log_tick(&mut self, tick: u64, stats: TickStats) {}

    #[allow(unused_variables)]
    fn log_event(&mut self, tick: u64, event: Event) {}

    fn save(&self) -> io::Result<()> {
        Ok(())
    }

    fn log_pick_up(&mut self, tick: u64, ant: usize, location: (usize, usize)) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::PickUp,
                ant: Some(ant),
                location: Some(location),
                heading: None,
            },
        );
    }

    fn log_deliver(&mut self, tick: u64, ant: usize, location: (usize, usize)) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Deliver,
                ant: Some(ant),
                location: Some(location),
                heading: None,
            },
        );
    }

    fn log_spawn(&mut self, tick: u64, ant: usize, location: (usize, usize), heading: Heading) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Spawn,
                ant: Some(ant),
                location: Some(location),
                heading: Some(heading),
            },
        );
    }

    fn log_diffuse(&mut self, tick: u64) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Diffuse,
                ant: None,
                location: None,
                heading: None,
            },
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum EventType {
    PickUp,
    Deliver,
    Spawn,
    Diffuse,
}

#[derive(Debug, serde::Serialize)]
pub struct Event {
    event_type: EventType,
    ant: Option<usize>,
    location: Option<(usize, usize)>,
    heading: Option<Heading>,
}

/// Colony counters sampled at the end of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TickStats {
    pub population: usize,
    pub carrying_food: usize,
    pub food_remaining: usize,
    pub deliveries: usize,
}

struct NoOpReplayLogger;
impl ReplayLogger for NoOpReplayLogger {}

struct JsonReplayLogger {
    filename: String,
    map_width: usize,
    map_height: usize,
    home: (usize, usize),
    config: SimConfig,
    ticks: Vec<(u64, TickStats)>,
    events: HashMap<u64, Vec<Event>>,
}

impl JsonReplayLogger {
    pub fn new(
        filename: String,
        map_width: usize,
        map_height: usize,
        home: (usize, usize),
        config: SimConfig,
    ) -> JsonReplayLogger {
        JsonReplayLogger {
            filename,
            map_width,
            map_height,
            home,
            config,
            ticks: Vec::new(),
            events: HashMap::new(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        let no_events = Vec::new();
        let ticks: Vec<_> = self
            .ticks
            .iter()
            .map(|(tick, stats)| {
                json!({
                    "tick": tick,
                    "stats": stats,
                    "events": self.events.get(tick).unwrap_or(&no_events),
                })
            })
            .collect();

        json!({
            "map": {
                "width": self.map_width,
                "height": self.map_height,
                "home": self.home,
            },
            "config": self.config,
            "ticks": ticks,
        })
    }
}

impl ReplayLogger for JsonReplayLogger {
    fn is_recording(&self) -> bool {
        true
    }

    fn log_tick(&mut self, tick: u64, stats: TickStats) {
        self.ticks.push((tick, stats));
    }

    fn log_event(&mut self, tick: u64, event: Event) {
        self.events.entry(tick).or_default().push(event);
    }

    fn save(&self) -> io::Result<()> {
        let file = File::create(&self.filename)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.to_json())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(population: usize) -> TickStats {
        TickStats {
            population,
            carrying_food: 1,
            food_remaining: 4,
            deliveries: 0,
        }
    }

    #[test]
    fn when_no_filename_is_given_saving_does_nothing() {
        let mut logger = create_replay_logger(None, 3, 3, (1, 1), SimConfig::default());
        assert!(!logger.is_recording());
        logger.log_tick(1, stats(2));
        logger.log_diffuse(1);
        assert!(logger.save().is_ok());
    }

    #[test]
    fn when_events_are_logged_they_are_grouped_under_their_tick() {
        let mut logger = JsonReplayLogger::new("unused".to_string(), 4, 2, (3, 1), SimConfig::default());
        logger.log_pick_up(1, 0, (2, 2));
        logger.log_tick(1, stats(1));
        logger.log_deliver(2, 0, (3, 1));
        logger.log_spawn(2, 1, (3, 1), Heading::East);
        logger.log_tick(2, stats(2));

        let json = logger.to_json();
        assert_eq!(json["map"]["home"], json!([3, 1]));
        assert_eq!(json["config"]["max_ants"], json!(5000));

        let ticks = json["ticks"].as_array().unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0]["events"][0]["event_type"], json!("PickUp"));
        assert_eq!(ticks[1]["stats"]["population"], json!(2));
        assert_eq!(ticks[1]["events"].as_array().unwrap().len(), 2);
        assert_eq!(ticks[1]["events"][1]["heading"], json!("East"));
    }

    #[test]
    fn when_saving_the_replay_is_written_as_json() {
        let path = std::env::temp_dir().join(format!("antcolony_replay_{}.json", std::process::id()));
        let filename = path.to_string_lossy().to_string();

        let mut logger = create_replay_logger(Some(filename), 2, 2, (0, 0), SimConfig::default());
        assert!(logger.is_recording());
        logger.log_tick(1, stats(1));
        logger.save().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["ticks"][0]["tick"], json!(1));
        std::fs::remove_file(&path).unwrap();
    }
}
