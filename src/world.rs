use crate::config::Config;
use crate::factory::AgentFactory;
use crate::model::{Agent, Health, MAX_RADIUS};
use crate::stats::PopulationStats;
use anyhow::{Context, Result};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use std::ops::RangeInclusive;

/// Changes applied to the population during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub n_births: usize,
    pub n_deaths: usize,
    pub n_infections: usize,
    pub seeded: bool,
}

/// Collection of live agents inside a rectangular arena.
pub struct World {
    width: f64,
    height: f64,
    contact_radius: f64,
    seed_interval: u64,
    fertile_ages: RangeInclusive<u32>,

    factory: AgentFactory,

    agt_vec: Vec<Agent>,
    last_seed_time: u64,

    stats: PopulationStats,
}

impl World {
    /// Create a world populated with sound agents spread uniformly inside the arena.
    pub fn new<R: Rng + ?Sized>(cfg: &Config, time: u64, rng: &mut R) -> Result<Self> {
        let mut world = Self::with_agents(cfg, Vec::new(), time)?;

        let x_dist = Uniform::new(MAX_RADIUS, cfg.arena.width - MAX_RADIUS)
            .context("failed to build horizontal position distribution")?;
        let y_dist = Uniform::new(MAX_RADIUS, cfg.arena.height - MAX_RADIUS)
            .context("failed to build vertical position distribution")?;

        world.agt_vec.reserve(cfg.population.n_agents);
        for _ in 0..cfg.population.n_agents {
            let x = x_dist.sample(rng);
            let y = y_dist.sample(rng);
            let agent = world.factory.make_agent(x, y, Health::Sound, time, rng);
            world.agt_vec.push(agent);
        }

        Ok(world)
    }

    /// Create a world holding the given agents.
    pub fn with_agents(cfg: &Config, agt_vec: Vec<Agent>, time: u64) -> Result<Self> {
        let factory = AgentFactory::new(cfg).context("failed to construct agent factory")?;
        let dyn_cfg = &cfg.dynamics;
        Ok(Self {
            width: cfg.arena.width,
            height: cfg.arena.height,
            contact_radius: dyn_cfg.contact_radius,
            seed_interval: dyn_cfg.seed_interval,
            fertile_ages: dyn_cfg.fertile_age_min..=dyn_cfg.fertile_age_max,
            factory,
            agt_vec,
            last_seed_time: time,
            stats: PopulationStats::new(),
        })
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agt_vec
    }

    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    pub fn n_ill(&self) -> usize {
        self.agt_vec.iter().filter(|agt| agt.is_ill()).count()
    }

    /// Advance the world by one tick ending at `time`.
    ///
    /// Every agent is read against the state left by the previous tick:
    /// infections, deaths and births found during the tick are only applied
    /// once all agents have been visited.
    pub fn update<R: Rng + ?Sized>(&mut self, time: u64, rng: &mut R) -> TickSummary {
        let mut i_agt_inf = Vec::new();
        let mut i_agt_dec = Vec::new();
        let mut born_vec = Vec::new();

        for agt in &mut self.agt_vec {
            agt.animate(time);
        }

        self.detect_contacts(&mut i_agt_inf);

        self.select_dec_and_born(time, rng, &mut i_agt_dec, &mut born_vec);

        let n_infections = self.infect_agents(&i_agt_inf, &mut i_agt_dec);

        let summary = TickSummary {
            n_births: born_vec.len(),
            n_deaths: i_agt_dec.len(),
            n_infections,
            seeded: false,
        };

        self.remove_deceased(&mut i_agt_dec);
        self.agt_vec.append(&mut born_vec);

        let seeded = self.seed_if_due(time, rng);

        self.update_stats();

        TickSummary { seeded, ..summary }
    }

    // Collect every agent within contact radius of some other ill agent.
    fn detect_contacts(&self, i_agt_inf: &mut Vec<usize>) {
        i_agt_inf.clear();
        for (i_agt, agt) in self.agt_vec.iter().enumerate() {
            let exposed = self.agt_vec.iter().enumerate().any(|(i_oth, oth)| {
                i_oth != i_agt && oth.is_ill() && oth.is_close_to(agt, self.contact_radius)
            });
            if exposed {
                i_agt_inf.push(i_agt);
            }
        }
    }

    fn select_dec_and_born<R: Rng + ?Sized>(
        &mut self,
        time: u64,
        rng: &mut R,
        i_agt_dec: &mut Vec<usize>,
        born_vec: &mut Vec<Agent>,
    ) {
        for (i_agt, agt) in self.agt_vec.iter_mut().enumerate() {
            if agt.is_dead() {
                i_agt_dec.push(i_agt);
                continue;
            }

            // Only an agent still heading out bounces, so a radius jump at a wall
            // cannot pin it there.
            let (vel_x, vel_y) = agt.velocity();
            let (x, y) = (agt.state().x, agt.state().y);
            if !agt.is_within_horizontal_limits(0.0, self.width)
                && is_heading_out(x, vel_x, self.width)
            {
                agt.invert_horizontal_direction();
            }
            if !agt.is_within_vertical_limits(0.0, self.height)
                && is_heading_out(y, vel_y, self.height)
            {
                agt.invert_vertical_direction();
            }

            if agt.is_fertile(&self.fertile_ages) {
                born_vec.push(agt.deliver_child(&self.factory, time, rng));
            }
        }
    }

    fn infect_agents(&mut self, i_agt_inf: &[usize], i_agt_dec: &mut Vec<usize>) -> usize {
        let mut n_infections = 0;
        for &i_agt in i_agt_inf {
            let agt = &mut self.agt_vec[i_agt];
            if agt.is_dead() {
                continue;
            }
            if agt.try_to_infect() {
                n_infections += 1;
                // Illness may bring the age of death down to the current age.
                if agt.is_dead() {
                    i_agt_dec.push(i_agt);
                }
            }
        }
        n_infections
    }

    fn remove_deceased(&mut self, i_agt_dec: &mut [usize]) {
        // Sort in reverse to safely remove by index.
        i_agt_dec.sort_by(|a, b| b.cmp(a));
        for &i_agt in i_agt_dec.iter() {
            self.agt_vec.swap_remove(i_agt);
        }
    }

    fn seed_if_due<R: Rng + ?Sized>(&mut self, time: u64, rng: &mut R) -> bool {
        if time.saturating_sub(self.last_seed_time) <= self.seed_interval {
            return false;
        }
        let (x, y) = (self.width / 2.0, self.height / 2.0);
        let agent = self.factory.make_agent(x, y, Health::Ill, time, rng);
        self.agt_vec.push(agent);
        self.last_seed_time = time;
        true
    }

    fn update_stats(&mut self) {
        self.stats.update_population_count(self.agt_vec.len());

        // A population without ill agents leaves the illness series untouched.
        let n_ill = self.n_ill();
        if n_ill > 0 {
            self.stats.update_ill_count(n_ill);
        }
    }
}

// Whether `pos` moves towards the nearer wall of `[0, side]`.
fn is_heading_out(pos: f64, vel: f64, side: f64) -> bool {
    if pos < side / 2.0 { vel < 0.0 } else { vel > 0.0 }
}
