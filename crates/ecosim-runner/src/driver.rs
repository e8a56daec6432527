//! Stepping loop. Actions from each step are handed to a consumer task over a
//! bounded channel so rendering never sits on the simulation's critical path.

use anyhow::{Context, Result};
use ecosim_core::Species;
use ecosim_world::{Action, Life, LifeView};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Population snapshot interval in iterations; 0 disables it
    pub report_every: u64,
    pub skip_invalid_steps: bool,
    pub max_consecutive_skips: u64,
    pub channel_capacity: usize,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            report_every: 100,
            skip_invalid_steps: false,
            max_consecutive_skips: 1_000,
            channel_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MaxIterations,
    Extinct,
    Interrupted,
    /// Too many consecutive steps were skipped
    Stalled,
}

/// Counts of rendered actions, by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionTally {
    pub steps: u64,
    pub moves: u64,
    pub consumes: u64,
    pub reproductions: u64,
    pub offspring: u64,
}

impl ActionTally {
    fn record(&mut self, actions: &[Action]) {
        self.steps += 1;
        for action in actions {
            match action {
                Action::Move { .. } => self.moves += 1,
                Action::Consume { .. } => self.consumes += 1,
                Action::Reproduce { offspring, .. } => {
                    self.reproductions += 1;
                    self.offspring += offspring.len() as u64;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub stop_reason: StopReason,
    pub iterations: u64,
    pub seed: Option<u64>,
    pub producers: usize,
    pub primary_consumers: usize,
    pub secondary_consumers: usize,
    pub births: u64,
    pub deaths: u64,
    pub consumptions: u64,
    pub skipped_steps: u64,
    pub actions: ActionTally,
}

impl RunSummary {
    fn new(life: &Life, stop_reason: StopReason, skipped_steps: u64, actions: ActionTally) -> Self {
        let stats = life.stats();
        Self {
            stop_reason,
            iterations: life.iteration(),
            seed: life.seed(),
            producers: life.population_of(Species::Producer),
            primary_consumers: life.population_of(Species::PrimaryConsumer),
            secondary_consumers: life.population_of(Species::SecondaryConsumer),
            births: stats.total_births(),
            deaths: stats.total_deaths(),
            consumptions: stats.total_consumptions(),
            skipped_steps,
            actions,
        }
    }

    pub fn log(&self) {
        info!(
            stop_reason = ?self.stop_reason,
            iterations = self.iterations,
            producers = self.producers,
            primary_consumers = self.primary_consumers,
            secondary_consumers = self.secondary_consumers,
            births = self.births,
            deaths = self.deaths,
            consumptions = self.consumptions,
            skipped_steps = self.skipped_steps,
            "Run finished"
        );
    }
}

/// Step `life` until it reaches its iteration bound, dies out, stalls, or
/// `stop` is raised.
pub async fn run(mut life: Life, options: DriverOptions, stop: Arc<AtomicBool>) -> Result<RunSummary> {
    let (tx, mut rx) = mpsc::channel::<Vec<Action>>(options.channel_capacity.max(1));

    let consumer = tokio::spawn(async move {
        let mut tally = ActionTally::default();
        while let Some(actions) = rx.recv().await {
            for action in &actions {
                trace!(%action, "Action");
            }
            tally.record(&actions);
        }
        tally
    });

    let mut skipped_steps = 0;
    let mut consecutive_skips = 0;

    let stop_reason = loop {
        if stop.load(Ordering::Relaxed) {
            break StopReason::Interrupted;
        }
        if life.reached_max_iterations() {
            break StopReason::MaxIterations;
        }
        if life.is_extinct() {
            break StopReason::Extinct;
        }

        match life.step() {
            Ok(actions) => {
                consecutive_skips = 0;
                tx.send(actions)
                    .await
                    .context("action consumer stopped early")?;
            }
            Err(e) if options.skip_invalid_steps && e.is_invalid_position() => {
                warn!(iteration = life.iteration(), error = %e, "Skipping step");
                skipped_steps += 1;
                consecutive_skips += 1;
                if consecutive_skips >= options.max_consecutive_skips {
                    break StopReason::Stalled;
                }
                // Nothing was sent, so give the consumer and signal task a turn.
                tokio::task::yield_now().await;
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("step {} failed", life.iteration()));
            }
        }

        if options.report_every > 0 && life.iteration() % options.report_every == 0 {
            report(&life);
        }
    };

    drop(tx);
    let tally = consumer.await.context("action consumer panicked")?;
    debug!(steps = tally.steps, "Action consumer drained");

    Ok(RunSummary::new(&life, stop_reason, skipped_steps, tally))
}

/// Predator and prey species pairs of the run's consume rules, predators in
/// species order.
pub fn food_chain(life: &Life) -> Vec<(Species, Vec<Species>)> {
    Species::ALL
        .into_iter()
        .filter(|species| species.consumes())
        .map(|predator| (predator, life.rules().prey_of(predator)))
        .collect()
}

fn report(life: &Life) {
    info!(
        iteration = life.iteration(),
        producers = life.population_of(Species::Producer),
        primary_consumers = life.population_of(Species::PrimaryConsumer),
        secondary_consumers = life.population_of(Species::SecondaryConsumer),
        "Population"
    );
}
