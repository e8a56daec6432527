//! Error types for the simulation.

use crate::types::{AgentId, Point2D, Species};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid position {point}: outside a {rows}x{cols} grid")]
    InvalidPosition { point: Point2D, rows: usize, cols: usize },

    #[error("No adjacent cell exists around {0}")]
    NoAdjacentCell(Point2D),

    #[error("Agent {0} is already dead")]
    AgentDead(AgentId),

    #[error("Agent {id} ({species}) cannot {capability}")]
    Incapable {
        id: AgentId,
        species: Species,
        capability: &'static str,
    },

    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl Error {
    /// True for the lookup and adjacency failures a driver may choose to skip.
    pub fn is_invalid_position(&self) -> bool {
        matches!(self, Error::InvalidPosition { .. } | Error::NoAdjacentCell(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_position_classification() {
        let out_of_range = Error::InvalidPosition {
            point: Point2D::new(10, 3),
            rows: 10,
            cols: 10,
        };
        assert!(out_of_range.is_invalid_position());
        assert!(Error::NoAdjacentCell(Point2D::new(0, 0)).is_invalid_position());
        assert!(!Error::AgentDead(AgentId(4)).is_invalid_position());
        assert!(!Error::Configuration("bad".to_string()).is_invalid_position());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidPosition {
            point: Point2D::new(-1, 2),
            rows: 3,
            cols: 4,
        };
        assert_eq!(err.to_string(), "Invalid position (-1, 2): outside a 3x4 grid");

        let err = Error::Incapable {
            id: AgentId(7),
            species: Species::Producer,
            capability: "age",
        };
        assert_eq!(err.to_string(), "Agent #7 (producer) cannot age");
    }
}
