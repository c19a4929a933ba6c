//! Agent data types and their per-tick transitions.

use crate::factory::AgentFactory;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Radius of a full-grown agent.
pub const MAX_RADIUS: f64 = 8.0;

/// Age of an agent, in years.
///
/// `years` never exceeds `death_years`: growing saturates at the age of death
/// and shortening the lifespan saturates at the current age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Age {
    years: u32,
    death_years: u32,
}

impl Age {
    pub fn new(years: u32, death_years: u32) -> Self {
        Self {
            years: years.min(death_years),
            death_years,
        }
    }

    pub fn years(&self) -> u32 {
        self.years
    }

    pub fn death_years(&self) -> u32 {
        self.death_years
    }

    pub fn grow(&mut self, years: u32) {
        self.years = self.years.saturating_add(years).min(self.death_years);
    }

    pub fn reduce_death_age(&mut self, years: u32) {
        self.death_years = self.death_years.saturating_sub(years).max(self.years);
    }

    pub fn is_time_to_die(&self) -> bool {
        self.years() == self.death_years()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    Sound,
    Ill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vaccination {
    NotVaccinated,
    Vaccinated,
}

/// Display color of an agent. Only meaningful to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Red,
    Yellow,
    Blue,
}

/// Observable state of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub x: f64,
    pub y: f64,
    pub age: Age,
    pub health: Health,
    pub vaccination: Vaccination,
}

impl AgentState {
    /// Radius grows by one unit every three years, from 2 up to [`MAX_RADIUS`].
    pub fn radius(&self) -> f64 {
        f64::from(self.age.years() / 3 + 2).min(MAX_RADIUS)
    }

    pub fn color(&self) -> Color {
        match (self.health, self.vaccination) {
            (Health::Ill, _) => Color::Red,
            (Health::Sound, Vaccination::NotVaccinated) => Color::Yellow,
            (Health::Sound, Vaccination::Vaccinated) => Color::Blue,
        }
    }

    pub fn is_within_horizontal_limits(&self, min_x: f64, max_x: f64) -> bool {
        let radius = self.radius();
        self.x - radius > min_x && self.x + radius < max_x
    }

    pub fn is_within_vertical_limits(&self, min_y: f64, max_y: f64) -> bool {
        let radius = self.radius();
        self.y - radius > min_y && self.y + radius < max_y
    }
}

/// Agent of the simulation.
///
/// Owns its [`AgentState`] together with its drift velocity,
/// its growth timer and the number of children it may still deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    state: AgentState,
    vel_x: f64,
    vel_y: f64,
    last_growth_time: u64,
    min_time_between_growths: u64,
    children_remaining: u32,
}

impl Agent {
    /// Create a new agent born at `birth_time`.
    pub fn new(
        state: AgentState,
        vel: (f64, f64),
        birth_time: u64,
        min_time_between_growths: u64,
        children_remaining: u32,
    ) -> Self {
        Self {
            state,
            vel_x: vel.0,
            vel_y: vel.1,
            last_growth_time: birth_time,
            min_time_between_growths,
            children_remaining,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn velocity(&self) -> (f64, f64) {
        (self.vel_x, self.vel_y)
    }

    pub fn children_remaining(&self) -> u32 {
        self.children_remaining
    }

    /// Move by one velocity step, then age by one year if enough time passed since the last birthday.
    pub fn animate(&mut self, time: u64) {
        self.advance();
        self.grow_if_possible(time);
    }

    /// Make the agent ill unless it already is or is vaccinated.
    ///
    /// Illness shortens the remaining lifespan by half the current age.
    /// Returns whether the agent became ill.
    pub fn try_to_infect(&mut self) -> bool {
        if self.state.health == Health::Ill || self.state.vaccination == Vaccination::Vaccinated {
            return false;
        }
        self.state.health = Health::Ill;
        let years = self.state.age.years();
        self.state.age.reduce_death_age(years / 2);
        true
    }

    pub fn invert_horizontal_direction(&mut self) {
        self.vel_x = -self.vel_x;
    }

    pub fn invert_vertical_direction(&mut self) {
        self.vel_y = -self.vel_y;
    }

    pub fn is_fertile(&self, fertile_ages: &RangeInclusive<u32>) -> bool {
        self.state.health != Health::Ill
            && self.children_remaining() > 0
            && fertile_ages.contains(&self.state.age.years())
    }

    pub fn is_close_to(&self, other: &Agent, contact_radius: f64) -> bool {
        let dist_x = other.state.x - self.state.x;
        let dist_y = other.state.y - self.state.y;
        dist_x.hypot(dist_y) < contact_radius
    }

    pub fn is_within_horizontal_limits(&self, min_x: f64, max_x: f64) -> bool {
        self.state.is_within_horizontal_limits(min_x, max_x)
    }

    pub fn is_within_vertical_limits(&self, min_y: f64, max_y: f64) -> bool {
        self.state.is_within_vertical_limits(min_y, max_y)
    }

    pub fn is_dead(&self) -> bool {
        self.state.age.is_time_to_die()
    }

    pub fn is_ill(&self) -> bool {
        self.state.health == Health::Ill
    }

    /// Deliver a sound child at the current position. It inherits nothing from its parent.
    pub fn deliver_child<R: Rng + ?Sized>(
        &mut self,
        factory: &AgentFactory,
        birth_time: u64,
        rng: &mut R,
    ) -> Agent {
        self.children_remaining = self.children_remaining.saturating_sub(1);
        factory.make_agent(self.state.x, self.state.y, Health::Sound, birth_time, rng)
    }

    fn advance(&mut self) {
        self.state.x += self.vel_x;
        self.state.y += self.vel_y;
    }

    fn grow_if_possible(&mut self, time: u64) {
        if time.saturating_sub(self.last_growth_time) >= self.min_time_between_growths {
            self.last_growth_time = time;
            self.state.age.grow(1);
        }
    }
}
