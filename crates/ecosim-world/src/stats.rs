//! Running per-species counters.

use ecosim_core::Species;
use serde::{Deserialize, Serialize};

/// Births, deaths and meals since the simulation started, per species.
/// Bootstrap agents are not counted as births.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeStats {
    births: [u64; 3],
    deaths: [u64; 3],
    consumptions: [u64; 3],
}

impl LifeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_birth(&mut self, species: Species) {
        self.births[species.index()] += 1;
    }

    pub fn record_death(&mut self, species: Species) {
        self.deaths[species.index()] += 1;
    }

    /// Counted against the predator's species.
    pub fn record_consumption(&mut self, predator: Species) {
        self.consumptions[predator.index()] += 1;
    }

    pub fn births(&self, species: Species) -> u64 {
        self.births[species.index()]
    }

    pub fn deaths(&self, species: Species) -> u64 {
        self.deaths[species.index()]
    }

    pub fn consumptions(&self, predator: Species) -> u64 {
        self.consumptions[predator.index()]
    }

    pub fn total_births(&self) -> u64 {
        self.births.iter().sum()
    }

    pub fn total_deaths(&self) -> u64 {
        self.deaths.iter().sum()
    }

    pub fn total_consumptions(&self) -> u64 {
        self.consumptions.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_tracking() {
        let mut stats = LifeStats::new();
        stats.record_birth(Species::Producer);
        stats.record_birth(Species::Producer);
        stats.record_birth(Species::SecondaryConsumer);
        stats.record_death(Species::PrimaryConsumer);
        stats.record_consumption(Species::SecondaryConsumer);

        assert_eq!(stats.births(Species::Producer), 2);
        assert_eq!(stats.births(Species::PrimaryConsumer), 0);
        assert_eq!(stats.total_births(), 3);
        assert_eq!(stats.deaths(Species::PrimaryConsumer), 1);
        assert_eq!(stats.total_deaths(), 1);
        assert_eq!(stats.consumptions(Species::SecondaryConsumer), 1);
        assert_eq!(stats.total_consumptions(), 1);
    }
}
