//! Who may eat whom.

use ecosim_core::Species;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Static predator -> prey table, consulted on every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeRules {
    prey: HashMap<Species, HashSet<Species>>,
}

impl ConsumeRules {
    /// The food chain: secondary consumers eat primary consumers, which eat producers.
    pub fn food_chain() -> Self {
        let mut prey = HashMap::new();
        prey.insert(
            Species::SecondaryConsumer,
            HashSet::from([Species::PrimaryConsumer]),
        );
        prey.insert(Species::PrimaryConsumer, HashSet::from([Species::Producer]));
        Self { prey }
    }

    pub fn can_consume(&self, predator: Species, prey: Species) -> bool {
        self.prey
            .get(&predator)
            .is_some_and(|allowed| allowed.contains(&prey))
    }

    /// Prey species of `predator`, sorted for stable output.
    pub fn prey_of(&self, predator: Species) -> Vec<Species> {
        let mut prey: Vec<Species> = self
            .prey
            .get(&predator)
            .map(|allowed| allowed.iter().copied().collect())
            .unwrap_or_default();
        prey.sort();
        prey
    }
}

impl Default for ConsumeRules {
    fn default() -> Self {
        Self::food_chain()
    }
}
