use crate::config::Config;
use crate::model::{Age, Agent, AgentState, Health, Vaccination};
use anyhow::{Context, Result};
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Uniform};

/// Creates agents with randomly drawn traits.
///
/// All distributions are built once from the configuration; the random source
/// is supplied by the caller so that runs can be reproduced from a seed.
#[derive(Debug, Clone)]
pub struct AgentFactory {
    death_age_dist: Uniform<u32>,
    vacc_dist: Bernoulli,
    children_dist: Uniform<u32>,
    sign_dist: Bernoulli,
    speed_scale: f64,
    speed_damping: f64,
    growth_interval: u64,
}

impl AgentFactory {
    pub fn new(cfg: &Config) -> Result<Self> {
        let pop = &cfg.population;
        Ok(Self {
            death_age_dist: Uniform::new_inclusive(pop.death_age_min, pop.death_age_max)
                .context("failed to build death age distribution")?,
            vacc_dist: Bernoulli::new(pop.prob_vacc)
                .context("failed to build vaccination distribution")?,
            children_dist: Uniform::new_inclusive(0, pop.children_max)
                .context("failed to build children distribution")?,
            sign_dist: Bernoulli::new(0.5).context("failed to build direction distribution")?,
            speed_scale: pop.speed_scale,
            speed_damping: pop.speed_damping,
            growth_interval: cfg.dynamics.growth_interval,
        })
    }

    /// Make a newborn agent at `(x, y)`.
    pub fn make_agent<R: Rng + ?Sized>(
        &self,
        x: f64,
        y: f64,
        health: Health,
        birth_time: u64,
        rng: &mut R,
    ) -> Agent {
        let age = Age::new(0, self.death_age_dist.sample(rng));
        let vaccination = if self.vacc_dist.sample(rng) {
            Vaccination::Vaccinated
        } else {
            Vaccination::NotVaccinated
        };
        let state = AgentState {
            x,
            y,
            age,
            health,
            vaccination,
        };

        let vel_x = self.sample_speed(rng);
        let vel_y = self.sample_speed(rng);
        let children = self.children_dist.sample(rng);

        Agent::new(state, (vel_x, vel_y), birth_time, self.growth_interval, children)
    }

    // Skewed towards slow drifts: the damping term divides the scale by up to `1 + damping`.
    fn sample_speed<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let num = rng.random::<f64>() * self.speed_scale;
        let den = rng.random::<f64>() * self.speed_damping + 1.0;
        let sign = if self.sign_dist.sample(rng) { 1.0 } else { -1.0 };
        sign * num / den
    }
}
