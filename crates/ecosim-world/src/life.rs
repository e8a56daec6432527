//! Simulation engine: owns the grid and population and advances them one
//! actor at a time.

use crate::action::Action;
use crate::agent::{Agent, IdGenerator};
use crate::grid::Grid;
use crate::rules::ConsumeRules;
use crate::stats::LifeStats;
use crate::view::LifeView;
use ecosim_core::{AgentId, Error, LifeConfig, Point2D, Result, Species};
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::{debug, event, instrument, trace, Level};

pub struct Life {
    config: LifeConfig,
    seed: Option<u64>,
    grid: Grid,
    agents: HashMap<AgentId, Agent>,
    // Selection order; kept separate from the map so seeded runs replay exactly
    population: Vec<AgentId>,
    ids: IdGenerator,
    rules: ConsumeRules,
    rng: ChaCha8Rng,
    iteration: u64,
    stats: LifeStats,
}

impl Life {
    /// Build a simulation seeded from `config.seed`, or from OS entropy when
    /// no seed is configured. The seed in use is available via [`Life::seed`].
    pub fn new(config: LifeConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut life = Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))?;
        life.seed = Some(seed);
        Ok(life)
    }

    /// Build a simulation drawing all randomness from `rng`.
    pub fn with_rng(config: LifeConfig, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;

        let mut life = Self {
            grid: Grid::new(config.grid_rows, config.grid_cols),
            config,
            seed: None,
            agents: HashMap::new(),
            population: Vec::new(),
            ids: IdGenerator::new(),
            rules: ConsumeRules::food_chain(),
            rng,
            iteration: 0,
            stats: LifeStats::new(),
        };
        life.populate()?;

        debug!(
            rows = life.grid.rows(),
            cols = life.grid.cols(),
            producers = life.population_of(Species::Producer),
            primary_consumers = life.population_of(Species::PrimaryConsumer),
            secondary_consumers = life.population_of(Species::SecondaryConsumer),
            ids_issued = life.ids.issued(),
            seed = ?life.seed,
            "Life created"
        );
        Ok(life)
    }

    /// Build a simulation from a flat parameter map.
    pub fn from_params(params: &HashMap<String, f64>) -> Result<Self> {
        Self::new(LifeConfig::from_params(params)?)
    }

    /// Scatter the configured initial population. Producers get distinct
    /// cells; consumers land on independently drawn cells.
    fn populate(&mut self) -> Result<()> {
        let positions: Vec<Point2D> = self.grid.positions().collect();
        let producer_cells = index::sample(
            &mut self.rng,
            positions.len(),
            self.config.producer.initial_count,
        );
        for cell in producer_cells.iter() {
            self.spawn(Species::Producer, positions[cell])?;
        }

        for species in [Species::PrimaryConsumer, Species::SecondaryConsumer] {
            for _ in 0..self.config.species(species).initial_count {
                let position = self.grid.random_point(&mut self.rng)?;
                self.spawn(species, position)?;
            }
        }
        Ok(())
    }

    /// Add a new agent of `species` with its configured initial energy.
    ///
    /// Refuses to put a second producer on a cell.
    pub fn spawn(&mut self, species: Species, position: Point2D) -> Result<AgentId> {
        if species == Species::Producer && self.grid.get(position)?.contains_producer() {
            return Err(Error::InvalidState(format!(
                "cell {position} already holds a producer"
            )));
        }
        let id = self.ids.next_id();
        let energy = self.config.species(species).initial_energy;
        self.add_agent(Agent::new(id, species, position, energy)?)?;
        Ok(id)
    }

    fn add_agent(&mut self, agent: Agent) -> Result<()> {
        self.grid.place(agent.position, agent.occupant())?;
        self.population.push(agent.id);
        self.agents.insert(agent.id, agent);
        Ok(())
    }

    /// Advance one step with a uniformly chosen actor.
    ///
    /// Returns the actions taken, in commit order. An empty population is a
    /// no-op: nothing is returned and the iteration does not advance.
    pub fn step(&mut self) -> Result<Vec<Action>> {
        let Some(&actor) = self.population.choose(&mut self.rng) else {
            return Ok(Vec::new());
        };
        self.step_agent(actor)
    }

    /// Advance one step with `id` as the actor.
    ///
    /// Adjacency and lookup failures are raised before the grid, the
    /// population or any energy level is touched.
    #[instrument(level = "trace", skip(self), fields(iteration = self.iteration))]
    pub fn step_agent(&mut self, id: AgentId) -> Result<Vec<Action>> {
        let actor = self.agents.get(&id).ok_or(Error::AgentNotFound(id))?;
        if !actor.is_alive() {
            return Err(Error::InvalidState(format!(
                "selected actor {id} is dead at iteration {}",
                self.iteration
            )));
        }

        let actions = if actor.species.is_mobile() {
            self.act_mobile(id)?
        } else {
            self.act_stationary(id)?;
            Vec::new()
        };

        self.iteration += 1;
        Ok(actions)
    }

    /// Move, maybe eat, maybe reproduce, age, then commit and sweep.
    fn act_mobile(&mut self, id: AgentId) -> Result<Vec<Action>> {
        let (species, from) = {
            let actor = self.agent_ref(id)?;
            (actor.species, actor.position)
        };

        let to = self.grid.random_adjacent_point(from, &mut self.rng)?;
        let mut actions = vec![Action::Move {
            agent: id,
            species,
            from,
            to,
        }];

        let rules = &self.rules;
        let prey: Vec<_> = self
            .grid
            .get(to)?
            .occupants()
            .iter()
            .filter(|occupant| rules.can_consume(species, occupant.species))
            .copied()
            .collect();
        if let Some(victim) = prey.choose(&mut self.rng) {
            actions.push(Action::Consume {
                predator: id,
                predator_species: species,
                prey: victim.id,
                prey_species: victim.species,
            });
        }

        let species_config = self.config.species(species);
        if self.rng.gen::<f64>() < species_config.reproduction_rate {
            let position = self.grid.random_adjacent_point(to, &mut self.rng)?;
            let child_id = self.ids.next_id();
            let child =
                self.agent_ref(id)?
                    .reproduce(child_id, position, species_config.initial_energy)?;
            actions.push(Action::Reproduce {
                parent: id,
                offspring: vec![child],
            });
        }

        if species.ages() {
            let decrease = self.config.energy_step_decrease;
            self.agent_mut(id)?.age_by(decrease)?;
        }

        self.commit(&actions)?;
        self.sweep_dead(to)?;
        Ok(actions)
    }

    /// Spread to a random neighboring cell unless it already has a producer.
    fn act_stationary(&mut self, id: AgentId) -> Result<()> {
        let (species, position) = {
            let actor = self.agent_ref(id)?;
            (actor.species, actor.position)
        };

        let target = self.grid.random_adjacent_point(position, &mut self.rng)?;
        if self.grid.get(target)?.contains_producer() {
            trace!(agent = %id, target = %target, "Neighbor already has a producer");
            return Ok(());
        }

        let child_id = self.ids.next_id();
        let energy = self.config.species(species).initial_energy;
        let child = self.agent_ref(id)?.reproduce(child_id, target, energy)?;
        trace!(parent = %id, child = %child.id, position = %target, "Producer spread");
        self.add_agent(child)?;
        self.record_birth(species);
        Ok(())
    }

    /// Apply actions in order. Agents killed here stay in place until the sweep.
    fn commit(&mut self, actions: &[Action]) -> Result<()> {
        debug_assert!(actions
            .windows(2)
            .all(|pair| pair[0].commit_order() < pair[1].commit_order()));
        for action in actions {
            trace!(action = %action, "Commit");
            match action {
                Action::Move { agent, from, to, .. } => {
                    self.grid.move_occupant(*agent, *from, *to)?;
                    self.agent_mut(*agent)?.move_to(*to);
                }
                Action::Consume {
                    predator,
                    predator_species,
                    prey,
                    prey_species,
                } => {
                    if !self.rules.can_consume(*predator_species, *prey_species) {
                        return Err(Error::InvalidState(format!(
                            "{predator_species} {predator} may not eat {prey_species} {prey}"
                        )));
                    }
                    let hunter = self.agent_ref(*predator)?.clone();
                    hunter.consume_all([self.agent_mut(*prey)?])?;
                    self.stats.record_consumption(*predator_species);
                }
                Action::Reproduce { offspring, .. } => {
                    for child in offspring {
                        self.add_agent(child.clone())?;
                        self.record_birth(child.species);
                    }
                }
            }
        }
        Ok(())
    }

    /// Remove dead agents from the cell at `point` and from the population.
    fn sweep_dead(&mut self, point: Point2D) -> Result<()> {
        let dead: Vec<AgentId> = self
            .grid
            .get(point)?
            .agent_ids()
            .filter(|id| self.agents.get(id).is_some_and(|agent| !agent.is_alive()))
            .collect();
        if dead.is_empty() {
            return Ok(());
        }

        let cell = self.grid.get_mut(point)?;
        for id in &dead {
            cell.remove(*id);
        }
        self.population.retain(|id| !dead.contains(id));

        for id in dead {
            if let Some(agent) = self.agents.remove(&id) {
                debug!(
                    agent = %id,
                    species = %agent.species,
                    position = %point,
                    iteration = self.iteration,
                    "Agent died"
                );
                self.stats.record_death(agent.species);
                event!(
                    Level::TRACE,
                    counter_name = "deaths",
                    counter_value = 1,
                    species = %agent.species,
                    "Death metric"
                );
            }
        }
        Ok(())
    }

    fn record_birth(&mut self, species: Species) {
        self.stats.record_birth(species);
        event!(
            Level::TRACE,
            counter_name = "births",
            counter_value = 1,
            species = %species,
            "Birth metric"
        );
    }

    fn agent_ref(&self, id: AgentId) -> Result<&Agent> {
        self.agents.get(&id).ok_or(Error::AgentNotFound(id))
    }

    fn agent_mut(&mut self, id: AgentId) -> Result<&mut Agent> {
        self.agents.get_mut(&id).ok_or(Error::AgentNotFound(id))
    }

    /// Seed of the internal generator, when it was derived from one.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn rules(&self) -> &ConsumeRules {
        &self.rules
    }

    /// Whether the advisory iteration bound has been reached.
    pub fn reached_max_iterations(&self) -> bool {
        self.config
            .max_iterations
            .is_some_and(|max| self.iteration >= max)
    }

    pub fn is_extinct(&self) -> bool {
        self.population.is_empty()
    }
}

impl LifeView for Life {
    fn agents(&self) -> Vec<&Agent> {
        self.population
            .iter()
            .filter_map(|id| self.agents.get(id))
            .collect()
    }

    fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    fn iteration(&self) -> u64 {
        self.iteration
    }

    fn max_iterations(&self) -> Option<u64> {
        self.config.max_iterations
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn config(&self) -> &LifeConfig {
        &self.config
    }

    fn stats(&self) -> &LifeStats {
        &self.stats
    }

    fn population(&self) -> usize {
        self.population.len()
    }
}
