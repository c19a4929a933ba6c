use crate::config::Config;
use crate::frame::Frame;
use crate::world::World;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rmp_serde::encode;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Simulation engine.
///
/// Holds the configuration, the world, the logical clock and the random number generator,
/// and provides methods to initialize and run simulations.
pub struct Engine {
    cfg: Config,
    world: World,
    time: u64,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine` with a random initial population.
    ///
    /// Without an explicit `seed` a fresh one is drawn; it is logged either way
    /// so that any run can be reproduced.
    pub fn generate_initial_condition(cfg: Config, seed: Option<u64>) -> Result<Self> {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        log::info!("seeding rng with {seed}");
        let mut rng = ChaCha12Rng::seed_from_u64(seed);

        let time = 0;
        let world =
            World::new(&cfg, time, &mut rng).context("failed to generate initial population")?;

        Ok(Self {
            cfg,
            world,
            time,
            rng,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    /// Perform the simulation and write the emitted frames to a binary file.
    pub fn perform_simulation<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        let n_ticks = self.cfg.output.n_ticks;
        let ticks_per_frame = self.cfg.output.ticks_per_frame;
        let ticks_per_report = (n_ticks / 100).max(1);

        for i_tick in 0..n_ticks {
            self.perform_tick();

            if (i_tick + 1) % ticks_per_frame == 0 {
                let frame = Frame::capture(self.time, &self.world);
                encode::write(&mut writer, &frame).context("failed to serialize frame")?;
            }

            if (i_tick + 1) % ticks_per_report == 0 {
                let progress = 100.0 * (i_tick + 1) as f64 / n_ticks as f64;
                log::info!("completed {progress:06.2}%");
            }
        }

        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }

    /// Advance the clock by one tick and update the world.
    pub fn perform_tick(&mut self) {
        self.time += self.cfg.output.time_per_tick;
        let summary = self.world.update(self.time, &mut self.rng);
        log::debug!(
            "t = {}: {} births, {} deaths, {} infections",
            self.time,
            summary.n_births,
            summary.n_deaths,
            summary.n_infections
        );
        if summary.seeded {
            log::debug!("seeded an ill agent at t = {}", self.time);
        }
    }

    /// Input hook. Key presses have no effect on the simulation.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn key_pressed(&mut self, _key: u32) {}

    /// Input hook. Key releases have no effect on the simulation.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn key_released(&mut self, _key: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmp_serde::decode;
    use std::{fs, io::BufReader};

    fn short_config() -> Config {
        let mut cfg = Config::default();
        cfg.population.n_agents = 50;
        cfg.output.n_ticks = 40;
        cfg.output.ticks_per_frame = 10;
        cfg
    }

    #[test]
    fn ticks_advance_the_clock() {
        let mut engine = Engine::generate_initial_condition(short_config(), Some(1)).unwrap();
        engine.key_pressed(32);
        engine.perform_tick();
        engine.perform_tick();
        engine.key_released(32);
        assert_eq!(engine.time(), 32);
        assert_eq!(engine.world().stats().counts(), &[50]);
    }

    #[test]
    fn simulation_writes_one_frame_per_interval() {
        let dir = std::env::temp_dir().join(format!("contagion-engine-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("frames.msgpack");

        let mut engine = Engine::generate_initial_condition(short_config(), Some(2)).unwrap();
        engine.perform_simulation(&file).unwrap();

        let mut reader = BufReader::new(File::open(&file).unwrap());
        let mut times = Vec::new();
        while let Ok(frame) = decode::from_read::<_, Frame>(&mut reader) {
            assert_eq!(frame.cells.len(), frame.stats.counts.last().copied().unwrap());
            times.push(frame.time);
        }
        assert_eq!(times, vec![160, 320, 480, 640]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn same_seed_gives_same_run() {
        let mut a = Engine::generate_initial_condition(short_config(), Some(9)).unwrap();
        let mut b = Engine::generate_initial_condition(short_config(), Some(9)).unwrap();
        for _ in 0..100 {
            a.perform_tick();
            b.perform_tick();
        }
        assert_eq!(a.world().agents(), b.world().agents());
        assert_eq!(a.world().stats().counts(), b.world().stats().counts());
    }
}
