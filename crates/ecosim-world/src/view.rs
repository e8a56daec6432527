//! Read-only access to a running simulation.

use crate::agent::Agent;
use crate::grid::Grid;
use crate::stats::LifeStats;
use ecosim_core::{AgentId, LifeConfig, Species};

/// What a presentation layer may see of a simulation. There is no mutation
/// path through this trait.
pub trait LifeView {
    /// Live agents in population order
    fn agents(&self) -> Vec<&Agent>;

    fn agent(&self, id: AgentId) -> Option<&Agent>;

    /// Number of completed steps
    fn iteration(&self) -> u64;

    /// Advisory bound; the simulation never stops by itself
    fn max_iterations(&self) -> Option<u64>;

    fn grid(&self) -> &Grid;

    fn config(&self) -> &LifeConfig;

    fn stats(&self) -> &LifeStats;

    fn grid_rows(&self) -> usize {
        self.grid().rows()
    }

    fn grid_cols(&self) -> usize {
        self.grid().cols()
    }

    fn population(&self) -> usize {
        self.agents().len()
    }

    fn population_of(&self, species: Species) -> usize {
        self.agents()
            .iter()
            .filter(|agent| agent.species == species)
            .count()
    }
}
