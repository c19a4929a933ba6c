use crate::model::MAX_RADIUS;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Arena dimensions.
    pub arena: ArenaConfig,
    /// Agent creation parameters.
    pub population: PopulationConfig,
    /// Contact, growth and seeding parameters.
    pub dynamics: DynamicsConfig,
    /// Run length and frame emission parameters.
    pub output: OutputConfig,
}

/// Bounding box agents bounce inside of, with its origin at `(0, 0)`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Arena width (default `1500`).
    pub width: f64,
    /// Arena height (default `700`).
    pub height: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1500.0,
            height: 700.0,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationConfig {
    /// Initial number of agents (default `500`).
    pub n_agents: usize,
    /// Probability of an agent being vaccinated at birth (default `0.8`).
    pub prob_vacc: f64,
    /// Smallest age of death drawn at birth (default `50`).
    pub death_age_min: u32,
    /// Largest age of death drawn at birth, inclusive (default `99`).
    pub death_age_max: u32,
    /// Largest number of children an agent may deliver, inclusive (default `2`).
    pub children_max: u32,
    /// Numerator scale of the drift speed distribution (default `3.0`).
    pub speed_scale: f64,
    /// Denominator damping of the drift speed distribution (default `5.0`).
    pub speed_damping: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            n_agents: 500,
            prob_vacc: 0.8,
            death_age_min: 50,
            death_age_max: 99,
            children_max: 2,
            speed_scale: 3.0,
            speed_damping: 5.0,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DynamicsConfig {
    /// Distance below which an ill agent reaches another one (default `10.0`).
    pub contact_radius: f64,
    /// Time units between two consecutive birthdays (default `500`).
    pub growth_interval: u64,
    /// Time units between two injections of an ill agent (default `10_000`).
    pub seed_interval: u64,
    /// Youngest fertile age, inclusive (default `18`).
    pub fertile_age_min: u32,
    /// Oldest fertile age, inclusive (default `50`).
    pub fertile_age_max: u32,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            contact_radius: 10.0,
            growth_interval: 500,
            seed_interval: 10_000,
            fertile_age_min: 18,
            fertile_age_max: 50,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Number of ticks performed per run (default `3600`).
    pub n_ticks: usize,
    /// Time units elapsed per tick (default `16`).
    pub time_per_tick: u64,
    /// Number of ticks between emitted frames (default `1`).
    pub ticks_per_frame: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            n_ticks: 3600,
            time_per_tick: 16,
            ticks_per_frame: 1,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded. Missing sections and fields take their default values.
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // A full-grown agent must fit strictly inside the arena.
        let min_side = 2.0 * MAX_RADIUS + 1.0;
        check_num(self.arena.width, min_side..=1e6).context("invalid arena width")?;
        check_num(self.arena.height, min_side..=1e6).context("invalid arena height")?;

        let pop = &self.population;
        check_num(pop.n_agents, 0..=100_000).context("invalid initial number of agents")?;
        check_num(pop.prob_vacc, 0.0..=1.0).context("invalid vaccination probability")?;
        check_range(pop.death_age_min, pop.death_age_max).context("invalid death age range")?;
        check_num(pop.death_age_min, 1..=1_000).context("invalid minimum death age")?;
        check_num(pop.children_max, 0..=100).context("invalid maximum number of children")?;
        check_num(pop.speed_scale, 0.0..=100.0).context("invalid speed scale")?;
        check_num(pop.speed_damping, 0.0..=100.0).context("invalid speed damping")?;

        let dyn_cfg = &self.dynamics;
        check_num(dyn_cfg.contact_radius, 0.0..=1e6).context("invalid contact radius")?;
        check_num(dyn_cfg.growth_interval, 1..).context("invalid growth interval")?;
        check_num(dyn_cfg.seed_interval, 1..).context("invalid seed interval")?;
        check_range(dyn_cfg.fertile_age_min, dyn_cfg.fertile_age_max)
            .context("invalid fertile age range")?;

        let out = &self.output;
        check_num(out.n_ticks, 1..=100_000_000).context("invalid number of ticks")?;
        check_num(out.time_per_tick, 1..).context("invalid time per tick")?;
        check_num(out.ticks_per_frame, 1..).context("invalid number of ticks per frame")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_range<T>(min: T, max: T) -> Result<()>
where
    T: PartialOrd + Debug,
{
    if min > max {
        bail!("range minimum {min:?} must not exceed its maximum {max:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: Config = toml::from_str(
            "[arena]\n\
             width = 400.0\n\
             \n\
             [population]\n\
             prob_vacc = 0.9\n",
        )
        .unwrap();

        assert_eq!(cfg.arena.width, 400.0);
        assert_eq!(cfg.arena.height, 700.0);
        assert_eq!(cfg.population.prob_vacc, 0.9);
        assert_eq!(cfg.population.n_agents, 500);
        assert_eq!(cfg.dynamics, DynamicsConfig::default());
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<Config>("[arena]\ndepth = 3.0\n").is_err());
    }

    #[test]
    fn zero_sized_arena_is_rejected() {
        let mut cfg = Config::default();
        cfg.arena.width = 0.0;
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("invalid arena width"));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let mut cfg = Config::default();
        cfg.population.death_age_min = 90;
        cfg.population.death_age_max = 60;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.dynamics.fertile_age_min = 40;
        cfg.dynamics.fertile_age_max = 20;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let mut cfg = Config::default();
        cfg.population.prob_vacc = 1.5;
        assert!(cfg.validate().is_err());
    }
}
