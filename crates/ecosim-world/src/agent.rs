//! Agent state and capabilities.

use crate::grid::Occupant;
use ecosim_core::{AgentId, Error, Point2D, Result, Species};
use serde::{Deserialize, Serialize};

/// Hands out agent ids for one simulation run. Ids are never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> AgentId {
        let id = AgentId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids issued so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}

/// An agent in the simulation.
///
/// Liveness is derived from energy, so `is_alive() == (energy() > 0)` holds
/// by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub species: Species,
    pub position: Point2D,
    energy: u32,
}

impl Agent {
    /// Create a living agent. Zero energy would mean dead on arrival.
    pub fn new(id: AgentId, species: Species, position: Point2D, energy: u32) -> Result<Self> {
        if energy == 0 {
            return Err(Error::AgentDead(id));
        }
        Ok(Self {
            id,
            species,
            position,
            energy,
        })
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    pub fn occupant(&self) -> Occupant {
        Occupant {
            id: self.id,
            species: self.species,
        }
    }

    pub(crate) fn move_to(&mut self, position: Point2D) {
        self.position = position;
    }

    /// Lose `amount` energy, dying if it runs out.
    pub fn age_by(&mut self, amount: u32) -> Result<()> {
        if !self.species.ages() {
            return Err(self.incapable("age"));
        }
        self.ensure_alive()?;
        self.energy = self.energy.saturating_sub(amount);
        Ok(())
    }

    /// Kill `prey`. The predator itself is left unchanged.
    ///
    /// A predator that died of age earlier in the same step may still
    /// complete its meal; only the prey has to be alive.
    pub fn consume(&self, prey: &mut Agent) -> Result<()> {
        if !self.species.consumes() {
            return Err(self.incapable("consume"));
        }
        if !prey.species.is_consumable() {
            return Err(prey.incapable("be consumed"));
        }
        prey.die()
    }

    pub fn consume_all<'a>(&self, prey: impl IntoIterator<Item = &'a mut Agent>) -> Result<()> {
        for victim in prey {
            self.consume(victim)?;
        }
        Ok(())
    }

    /// A same-species offspring at `position` with `energy`.
    pub fn reproduce(&self, id: AgentId, position: Point2D, energy: u32) -> Result<Agent> {
        self.ensure_alive()?;
        Agent::new(id, self.species, position, energy)
    }

    fn die(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.energy = 0;
        Ok(())
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(Error::AgentDead(self.id))
        }
    }

    fn incapable(&self, capability: &'static str) -> Error {
        Error::Incapable {
            id: self.id,
            species: self.species,
            capability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(ids: &mut IdGenerator, species: Species, energy: u32) -> Agent {
        Agent::new(ids.next_id(), species, Point2D::new(0, 0), energy).unwrap()
    }

    #[test]
    fn test_id_generator_is_monotonic() {
        let mut ids = IdGenerator::new();
        let first = ids.next_id();
        let second = ids.next_id();
        assert!(second > first);
        assert_eq!(ids.issued(), 2);

        let mut other_run = IdGenerator::new();
        assert_eq!(other_run.next_id(), first);
    }

    #[test]
    fn test_agent_creation() {
        let agent = Agent::new(AgentId(3), Species::PrimaryConsumer, Point2D::new(2, 4), 10).unwrap();
        assert_eq!(agent.energy(), 10);
        assert!(agent.is_alive());
        assert_eq!(agent.position, Point2D::new(2, 4));
        assert_eq!(
            agent.occupant(),
            Occupant {
                id: AgentId(3),
                species: Species::PrimaryConsumer
            }
        );
    }

    #[test]
    fn test_zero_energy_agent_rejected() {
        let result = Agent::new(AgentId(1), Species::Producer, Point2D::new(0, 0), 0);
        assert!(matches!(result, Err(Error::AgentDead(AgentId(1)))));
    }

    #[test]
    fn test_aging() {
        let mut ids = IdGenerator::new();
        let mut deer = agent(&mut ids, Species::PrimaryConsumer, 100);
        deer.age_by(10).unwrap();
        assert_eq!(deer.energy(), 90);

        deer.age_by(200).unwrap();
        assert_eq!(deer.energy(), 0);
        assert!(!deer.is_alive());

        assert!(matches!(deer.age_by(1), Err(Error::AgentDead(_))));
    }

    #[test]
    fn test_producers_do_not_age() {
        let mut ids = IdGenerator::new();
        let mut grass = agent(&mut ids, Species::Producer, 5);
        assert!(matches!(
            grass.age_by(1),
            Err(Error::Incapable { capability: "age", .. })
        ));
        assert_eq!(grass.energy(), 5);
    }

    #[test]
    fn test_consume_kills_prey_only() {
        let mut ids = IdGenerator::new();
        let wolf = agent(&mut ids, Species::SecondaryConsumer, 10);
        let mut deer = agent(&mut ids, Species::PrimaryConsumer, 10);

        wolf.consume(&mut deer).unwrap();
        assert!(!deer.is_alive());
        assert_eq!(deer.energy(), 0);
        assert_eq!(wolf.energy(), 10);

        assert!(matches!(wolf.consume(&mut deer), Err(Error::AgentDead(_))));
    }

    #[test]
    fn test_producer_cannot_consume() {
        let mut ids = IdGenerator::new();
        let grass = agent(&mut ids, Species::Producer, 10);
        let mut other = agent(&mut ids, Species::Producer, 10);
        assert!(matches!(
            grass.consume(&mut other),
            Err(Error::Incapable { capability: "consume", .. })
        ));
        assert!(other.is_alive());
    }

    #[test]
    fn test_consume_all() {
        let mut ids = IdGenerator::new();
        let deer = agent(&mut ids, Species::PrimaryConsumer, 10);
        let mut meadow: Vec<Agent> = (0..20)
            .map(|_| agent(&mut ids, Species::Producer, 3))
            .collect();

        deer.consume_all(meadow.iter_mut()).unwrap();
        assert!(meadow.iter().all(|grass| !grass.is_alive()));
    }

    #[test]
    fn test_reproduce_same_species() {
        let mut ids = IdGenerator::new();
        let wolf = agent(&mut ids, Species::SecondaryConsumer, 3);
        let cub = wolf.reproduce(ids.next_id(), Point2D::new(1, 0), 25).unwrap();
        assert_eq!(cub.species, Species::SecondaryConsumer);
        assert_eq!(cub.energy(), 25);
        assert_eq!(cub.position, Point2D::new(1, 0));
        assert_ne!(cub.id, wolf.id);
    }
}
