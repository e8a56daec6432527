//! Predator-prey simulation engine.
//!
//! A [`Life`] owns a bounded [`Grid`] and a population of [`Agent`]s. Each
//! call to [`Life::step`] lets one randomly chosen agent act and returns the
//! [`Action`]s it took.

pub mod action;
pub mod agent;
pub mod grid;
pub mod life;
pub mod rules;
pub mod stats;
pub mod view;

pub use action::Action;
pub use agent::{Agent, IdGenerator};
pub use grid::{Cell, Grid, Occupant};
pub use life::Life;
pub use rules::ConsumeRules;
pub use stats::LifeStats;
pub use view::LifeView;
