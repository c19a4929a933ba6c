//! Read-only snapshots handed to renderers.

use crate::model::Color;
use crate::stats::{Exporter, Limits};
use crate::world::World;
use serde::{Deserialize, Serialize};

/// Drawable view of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Color,
}

/// Owned copy of a population statistics export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub limits: Limits,
    pub counts: Vec<usize>,
    pub ill_counts: Vec<usize>,
}

impl Exporter for StatsSnapshot {
    fn export(&mut self, limits: Limits, counts: &[usize], ill_counts: &[usize]) {
        self.limits = limits;
        self.counts.clear();
        self.counts.extend_from_slice(counts);
        self.ill_counts.clear();
        self.ill_counts.extend_from_slice(ill_counts);
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: u64,
    pub cells: Vec<CellView>,
    pub stats: StatsSnapshot,
}

impl Frame {
    pub fn capture(time: u64, world: &World) -> Self {
        let cells = world
            .agents()
            .iter()
            .map(|agt| {
                let state = agt.state();
                CellView {
                    x: state.x,
                    y: state.y,
                    radius: state.radius(),
                    color: state.color(),
                }
            })
            .collect();

        let mut stats = StatsSnapshot::default();
        world.stats().export(&mut stats);

        Self { time, cells, stats }
    }
}
