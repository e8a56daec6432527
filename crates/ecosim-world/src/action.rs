//! Actions recorded while a step is selected and applied when it commits.

use crate::agent::Agent;
use ecosim_core::{AgentId, Point2D, Species};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An intended effect of one step.
///
/// Every field is an owned copy, so a step's `Vec<Action>` is an immutable
/// snapshot that can be sent to another thread for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Move {
        agent: AgentId,
        species: Species,
        from: Point2D,
        to: Point2D,
    },
    Consume {
        predator: AgentId,
        predator_species: Species,
        prey: AgentId,
        prey_species: Species,
    },
    Reproduce {
        parent: AgentId,
        offspring: Vec<Agent>,
    },
}

impl Action {
    /// The agent that performed the action.
    pub fn actor(&self) -> AgentId {
        match self {
            Action::Move { agent, .. } => *agent,
            Action::Consume { predator, .. } => *predator,
            Action::Reproduce { parent, .. } => *parent,
        }
    }

    /// Commit position: moves before consumption before reproduction.
    pub fn commit_order(&self) -> u8 {
        match self {
            Action::Move { .. } => 0,
            Action::Consume { .. } => 1,
            Action::Reproduce { .. } => 2,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move {
                agent,
                species,
                from,
                to,
            } => write!(f, "move {species} {agent} {from} -> {to}"),
            Action::Consume {
                predator,
                predator_species,
                prey,
                prey_species,
            } => write!(
                f,
                "{predator_species} {predator} consumes {prey_species} {prey}"
            ),
            Action::Reproduce { parent, offspring } => {
                write!(f, "{parent} reproduces:")?;
                for child in offspring {
                    write!(f, " {} at {}", child.id, child.position)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_actions() -> Vec<Action> {
        let child = Agent::new(
            AgentId(9),
            Species::SecondaryConsumer,
            Point2D::new(3, 3),
            10,
        )
        .unwrap();
        vec![
            Action::Move {
                agent: AgentId(1),
                species: Species::SecondaryConsumer,
                from: Point2D::new(2, 2),
                to: Point2D::new(2, 3),
            },
            Action::Consume {
                predator: AgentId(1),
                predator_species: Species::SecondaryConsumer,
                prey: AgentId(4),
                prey_species: Species::PrimaryConsumer,
            },
            Action::Reproduce {
                parent: AgentId(1),
                offspring: vec![child],
            },
        ]
    }

    #[test]
    fn test_actor_and_order() {
        let actions = sample_actions();
        assert!(actions.iter().all(|action| action.actor() == AgentId(1)));
        let order: Vec<u8> = actions.iter().map(Action::commit_order).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_display() {
        let text: Vec<String> = sample_actions().iter().map(ToString::to_string).collect();
        assert_eq!(text[0], "move secondary consumer #1 (2, 2) -> (2, 3)");
        assert_eq!(text[1], "secondary consumer #1 consumes primary consumer #4");
        assert_eq!(text[2], "#1 reproduces: #9 at (3, 3)");
    }

    #[test]
    fn test_action_serialization() {
        let actions = sample_actions();
        let json = serde_json::to_string(&actions).unwrap();
        assert!(json.contains(r#""kind":"consume""#));
        let restored: Vec<Action> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, actions);
    }

    #[test]
    fn test_actions_can_cross_threads() {
        let actions = sample_actions();
        let handle = std::thread::spawn(move || actions.len());
        assert_eq!(handle.join().unwrap(), 3);
    }
}
