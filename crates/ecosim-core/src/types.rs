//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an agent, unique for the lifetime of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Grid coordinate or relative offset. `x` indexes rows, `y` indexes columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point2D {
    pub x: i32,
    pub y: i32,
}

impl Point2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The neighbor one step away in `direction`.
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// Chebyshev distance; adjacent points are exactly 1 apart.
    pub fn chebyshev_distance(&self, other: &Point2D) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn is_adjacent_to(&self, other: &Point2D) -> bool {
        self.chebyshev_distance(other) == 1
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction to one of the eight Moore neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }
}

/// The three species of the food chain.
///
/// Behavior is driven by the capability table below rather than by
/// per-type code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    /// Stationary; spreads to neighboring cells.
    Producer,
    /// Mobile grazer, eats producers.
    PrimaryConsumer,
    /// Mobile predator, eats primary consumers.
    SecondaryConsumer,
}

impl Species {
    pub const ALL: [Species; 3] = [
        Species::Producer,
        Species::PrimaryConsumer,
        Species::SecondaryConsumer,
    ];

    /// Loses energy each time it acts.
    pub fn ages(&self) -> bool {
        !matches!(self, Species::Producer)
    }

    /// May eat other agents.
    pub fn consumes(&self) -> bool {
        !matches!(self, Species::Producer)
    }

    /// May be eaten.
    pub fn is_consumable(&self) -> bool {
        true
    }

    /// Moves to a neighboring cell when it acts.
    pub fn is_mobile(&self) -> bool {
        !matches!(self, Species::Producer)
    }

    /// Prefix of this species' keys in a parameter map.
    pub fn param_prefix(&self) -> &'static str {
        match self {
            Species::Producer => "producer",
            Species::PrimaryConsumer => "primary",
            Species::SecondaryConsumer => "secondary",
        }
    }

    /// Position in `Species::ALL`, for per-species tables.
    pub fn index(&self) -> usize {
        match self {
            Species::Producer => 0,
            Species::PrimaryConsumer => 1,
            Species::SecondaryConsumer => 2,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Species::Producer => "producer",
            Species::PrimaryConsumer => "primary consumer",
            Species::SecondaryConsumer => "secondary consumer",
        };
        f.write_str(name)
    }
}
