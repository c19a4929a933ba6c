use serde::{Deserialize, Serialize};

/// Running extrema of both population series.
///
/// Each bound is `None` until the first value of its series is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub pop_min: Option<usize>,
    pub pop_max: Option<usize>,
    pub ill_min: Option<usize>,
    pub ill_max: Option<usize>,
}

/// Consumer of a [`PopulationStats`] export.
pub trait Exporter {
    fn export(&mut self, limits: Limits, counts: &[usize], ill_counts: &[usize]);
}

/// Run-length compressed series of a count together with its extrema.
#[derive(Debug, Clone, Default)]
struct CountSeries {
    vals: Vec<usize>,
    min: Option<usize>,
    max: Option<usize>,
}

impl CountSeries {
    fn update(&mut self, val: usize) -> bool {
        if self.vals.last() == Some(&val) {
            return false;
        }
        self.min = Some(self.min.map_or(val, |min| min.min(val)));
        self.max = Some(self.max.map_or(val, |max| max.max(val)));
        self.vals.push(val);
        true
    }
}

/// Population and illness counts over time.
///
/// A count is recorded only when it differs from the previous one of its series.
#[derive(Debug, Clone, Default)]
pub struct PopulationStats {
    counts: CountSeries,
    ill_counts: CountSeries,
}

impl PopulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the total population. Returns whether the value was appended.
    pub fn update_population_count(&mut self, count: usize) -> bool {
        self.counts.update(count)
    }

    /// Record the number of ill agents. Returns whether the value was appended.
    pub fn update_ill_count(&mut self, ill_count: usize) -> bool {
        self.ill_counts.update(ill_count)
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts.vals
    }

    pub fn ill_counts(&self) -> &[usize] {
        &self.ill_counts.vals
    }

    pub fn limits(&self) -> Limits {
        Limits {
            pop_min: self.counts.min,
            pop_max: self.counts.max,
            ill_min: self.ill_counts.min,
            ill_max: self.ill_counts.max,
        }
    }

    pub fn export(&self, exporter: &mut dyn Exporter) {
        exporter.export(self.limits(), self.counts(), self.ill_counts());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_unset_before_first_value() {
        let stats = PopulationStats::new();
        assert_eq!(stats.limits(), Limits::default());
        assert!(stats.counts().is_empty());
    }

    #[test]
    fn consecutive_duplicates_are_dropped() {
        let mut stats = PopulationStats::new();
        for count in [5, 5, 6, 6, 6, 5, 7, 7] {
            stats.update_population_count(count);
        }
        assert_eq!(stats.counts(), &[5, 6, 5, 7]);
        assert!(stats.counts().windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn extrema_match_recorded_series() {
        let mut stats = PopulationStats::new();
        for (count, ill_count) in [(500, 1), (498, 3), (510, 2), (510, 9), (490, 9), (495, 4)] {
            stats.update_population_count(count);
            stats.update_ill_count(ill_count);
        }

        let limits = stats.limits();
        assert_eq!(limits.pop_min, stats.counts().iter().copied().min());
        assert_eq!(limits.pop_max, stats.counts().iter().copied().max());
        assert_eq!(limits.ill_min, stats.ill_counts().iter().copied().min());
        assert_eq!(limits.ill_max, stats.ill_counts().iter().copied().max());
        assert_eq!(limits.pop_min, Some(490));
        assert_eq!(limits.ill_max, Some(9));
    }

    #[test]
    fn exporter_receives_series_and_limits() {
        #[derive(Default)]
        struct Collector {
            limits: Limits,
            counts: Vec<usize>,
            ill_counts: Vec<usize>,
            n_exports: usize,
        }

        impl Exporter for Collector {
            fn export(&mut self, limits: Limits, counts: &[usize], ill_counts: &[usize]) {
                self.limits = limits;
                self.counts = counts.to_vec();
                self.ill_counts = ill_counts.to_vec();
                self.n_exports += 1;
            }
        }

        let mut stats = PopulationStats::new();
        stats.update_population_count(10);
        stats.update_population_count(12);
        stats.update_ill_count(1);

        let mut collector = Collector::default();
        stats.export(&mut collector);

        assert_eq!(collector.n_exports, 1);
        assert_eq!(collector.counts, vec![10, 12]);
        assert_eq!(collector.ill_counts, vec![1]);
        assert_eq!(collector.limits.pop_min, Some(10));
        assert_eq!(collector.limits.pop_max, Some(12));
        assert_eq!(collector.limits.ill_min, Some(1));
        assert_eq!(collector.limits.ill_max, Some(1));
    }
}
