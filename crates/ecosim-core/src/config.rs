//! Configuration types for the simulation.
//!
//! A [`LifeConfig`] is normally built from a flat map of named numeric
//! parameters (see the `KEY_*` constants), which is how drivers and
//! parameter files describe a run. Missing keys take the defaults below;
//! unknown keys are ignored.

use crate::error::{Error, Result};
use crate::types::Species;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub const KEY_MAX_ITERATIONS: &str = "max_iterations";
pub const KEY_GRID_ROWS: &str = "grid_rows";
pub const KEY_GRID_COLS: &str = "grid_cols";
pub const KEY_ENERGY_STEP_DECREASE: &str = "energy_step_decrease";
pub const KEY_SEED: &str = "seed";

/// Suffixes of the per-species keys, e.g. `primary_count`.
pub const SUFFIX_COUNT: &str = "count";
pub const SUFFIX_INITIAL_ENERGY: &str = "initial_energy";
pub const SUFFIX_REPRODUCTION_RATE: &str = "reproduction_rate";
pub const SUFFIX_ENERGY_GAIN: &str = "energy_gain";

pub const DEFAULT_GRID_SIZE: usize = 10;
pub const DEFAULT_INITIAL_COUNT: usize = 5;
pub const DEFAULT_INITIAL_ENERGY: u32 = 10;
pub const DEFAULT_REPRODUCTION_RATE: f64 = 0.33;
pub const DEFAULT_ENERGY_GAIN: u32 = 2;
pub const DEFAULT_ENERGY_STEP_DECREASE: u32 = 1;

/// Largest grid, in cells, that [`LifeConfig::validate`] accepts.
pub const MAX_CELLS: usize = 1 << 22;

/// Builds the parameter key for one species, e.g. `species_key(Producer, "count")`.
pub fn species_key(species: Species, suffix: &str) -> String {
    format!("{}_{}", species.param_prefix(), suffix)
}

/// Per-species parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConfig {
    /// Number of agents created at bootstrap
    pub initial_count: usize,
    /// Energy of every newly created agent, at bootstrap or birth
    pub initial_energy: u32,
    /// Probability of reproducing when chosen to act (0.0 to 1.0)
    pub reproduction_rate: f64,
    /// Energy gain associated with eating; carried for reporting, not applied when stepping
    pub energy_gain: u32,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            initial_count: DEFAULT_INITIAL_COUNT,
            initial_energy: DEFAULT_INITIAL_ENERGY,
            reproduction_rate: DEFAULT_REPRODUCTION_RATE,
            energy_gain: DEFAULT_ENERGY_GAIN,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeConfig {
    /// Number of grid rows
    pub grid_rows: usize,
    /// Number of grid columns
    pub grid_cols: usize,
    pub producer: SpeciesConfig,
    pub primary: SpeciesConfig,
    pub secondary: SpeciesConfig,
    /// Energy lost by an aging agent each time it acts
    pub energy_step_decrease: u32,
    /// Advisory iteration bound for drivers; `None` runs indefinitely
    pub max_iterations: Option<u64>,
    /// Random seed for reproducibility; `None` draws one from OS entropy
    pub seed: Option<u64>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid_rows: DEFAULT_GRID_SIZE,
            grid_cols: DEFAULT_GRID_SIZE,
            producer: SpeciesConfig::default(),
            primary: SpeciesConfig::default(),
            secondary: SpeciesConfig::default(),
            energy_step_decrease: DEFAULT_ENERGY_STEP_DECREASE,
            max_iterations: None,
            seed: None,
        }
    }
}

impl LifeConfig {
    pub fn species(&self, species: Species) -> &SpeciesConfig {
        match species {
            Species::Producer => &self.producer,
            Species::PrimaryConsumer => &self.primary,
            Species::SecondaryConsumer => &self.secondary,
        }
    }

    pub fn species_mut(&mut self, species: Species) -> &mut SpeciesConfig {
        match species {
            Species::Producer => &mut self.producer,
            Species::PrimaryConsumer => &mut self.primary,
            Species::SecondaryConsumer => &mut self.secondary,
        }
    }

    /// Sum of the initial counts of all species.
    pub fn initial_population(&self) -> usize {
        Species::ALL
            .iter()
            .map(|species| self.species(*species).initial_count)
            .sum()
    }

    /// Build a validated configuration from a flat parameter map.
    pub fn from_params(params: &HashMap<String, f64>) -> Result<Self> {
        let mut config = Self::default();
        config.apply_params(params)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from a parameter map without validating the result.
    pub fn apply_params(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        for (key, &value) in params {
            if !self.apply_param(key, value)? {
                debug!(key = %key, value, "Ignoring unknown parameter");
            }
        }
        Ok(())
    }

    /// Returns `Ok(false)` when the key is not recognised.
    fn apply_param(&mut self, key: &str, value: f64) -> Result<bool> {
        match key {
            KEY_GRID_ROWS => self.grid_rows = parse_count(key, value)?,
            KEY_GRID_COLS => self.grid_cols = parse_count(key, value)?,
            KEY_ENERGY_STEP_DECREASE => self.energy_step_decrease = parse_energy(key, value)?,
            KEY_MAX_ITERATIONS => {
                let value = require_finite(key, value)?;
                self.max_iterations = (value >= 0.0).then(|| value.trunc() as u64);
            }
            KEY_SEED => self.seed = Some(parse_count(key, value)? as u64),
            _ => {
                let Some((species, suffix)) = split_species_key(key) else {
                    return Ok(false);
                };
                let species_config = self.species_mut(species);
                match suffix {
                    SUFFIX_COUNT => species_config.initial_count = parse_count(key, value)?,
                    SUFFIX_INITIAL_ENERGY => {
                        species_config.initial_energy = parse_energy(key, value)?
                    }
                    SUFFIX_REPRODUCTION_RATE => {
                        species_config.reproduction_rate = parse_rate(key, value)?
                    }
                    SUFFIX_ENERGY_GAIN => species_config.energy_gain = parse_energy(key, value)?,
                    _ => return Ok(false),
                }
            }
        }
        Ok(true)
    }

    /// Flatten back into the parameter map form accepted by [`LifeConfig::from_params`].
    pub fn to_params(&self) -> HashMap<String, f64> {
        let mut params = HashMap::new();
        params.insert(KEY_GRID_ROWS.to_string(), self.grid_rows as f64);
        params.insert(KEY_GRID_COLS.to_string(), self.grid_cols as f64);
        params.insert(
            KEY_ENERGY_STEP_DECREASE.to_string(),
            f64::from(self.energy_step_decrease),
        );
        params.insert(
            KEY_MAX_ITERATIONS.to_string(),
            self.max_iterations.map_or(-1.0, |max| max as f64),
        );
        if let Some(seed) = self.seed {
            params.insert(KEY_SEED.to_string(), seed as f64);
        }
        for species in Species::ALL {
            let species_config = self.species(species);
            params.insert(
                species_key(species, SUFFIX_COUNT),
                species_config.initial_count as f64,
            );
            params.insert(
                species_key(species, SUFFIX_INITIAL_ENERGY),
                f64::from(species_config.initial_energy),
            );
            params.insert(
                species_key(species, SUFFIX_REPRODUCTION_RATE),
                species_config.reproduction_rate,
            );
            params.insert(
                species_key(species, SUFFIX_ENERGY_GAIN),
                f64::from(species_config.energy_gain),
            );
        }
        params
    }

    /// Parse a JSON object of `key -> number`.
    ///
    /// Keys with non-numeric values are only an error when the key is one we
    /// recognise; anything else in the object is ignored.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut params = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            match value.as_f64() {
                Some(number) => {
                    params.insert(key, number);
                }
                None if is_param_key(&key) => {
                    return Err(Error::Configuration(format!(
                        "{key} must be a number, got {value}"
                    )));
                }
                None => debug!(key = %key, "Ignoring non-numeric unknown parameter"),
            }
        }
        Self::from_params(&params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every range constraint. Called before any grid or agent exists.
    ///
    /// The grid must hold at most [`MAX_CELLS`] cells. Producers are placed
    /// one per cell, so more producers than cells is rejected here.
    /// Parameter sets that expect surplus producers to share a cell are not
    /// compatible with this engine and fail to load.
    pub fn validate(&self) -> Result<()> {
        for species in Species::ALL {
            let species_config = self.species(species);
            let rate = species_config.reproduction_rate;
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(Error::Configuration(format!(
                    "{} must be between 0 and 1, got {}",
                    species_key(species, SUFFIX_REPRODUCTION_RATE),
                    rate
                )));
            }
            if species_config.initial_count > 0 && species_config.initial_energy == 0 {
                return Err(Error::Configuration(format!(
                    "{} must be positive when {} is {}",
                    species_key(species, SUFFIX_INITIAL_ENERGY),
                    species_key(species, SUFFIX_COUNT),
                    species_config.initial_count
                )));
            }
        }

        if i32::try_from(self.grid_rows).is_err() || i32::try_from(self.grid_cols).is_err() {
            return Err(Error::Configuration(format!(
                "grid {}x{} exceeds the coordinate range",
                self.grid_rows, self.grid_cols
            )));
        }
        let cells = match self.grid_rows.checked_mul(self.grid_cols) {
            Some(cells) if cells <= MAX_CELLS => cells,
            _ => {
                return Err(Error::Configuration(format!(
                    "grid {}x{} exceeds {} cells",
                    self.grid_rows, self.grid_cols, MAX_CELLS
                )))
            }
        };
        if cells == 0 && self.initial_population() > 0 {
            return Err(Error::Configuration(format!(
                "cannot place {} agents on a {}x{} grid",
                self.initial_population(),
                self.grid_rows,
                self.grid_cols
            )));
        }
        if self.producer.initial_count > cells {
            return Err(Error::Configuration(format!(
                "{} producers do not fit one per cell on a {}x{} grid",
                self.producer.initial_count, self.grid_rows, self.grid_cols
            )));
        }

        Ok(())
    }
}

/// Whether `key` names a recognised parameter.
pub fn is_param_key(key: &str) -> bool {
    match key {
        KEY_GRID_ROWS | KEY_GRID_COLS | KEY_ENERGY_STEP_DECREASE | KEY_MAX_ITERATIONS
        | KEY_SEED => true,
        _ => split_species_key(key).is_some_and(|(_, suffix)| {
            matches!(
                suffix,
                SUFFIX_COUNT | SUFFIX_INITIAL_ENERGY | SUFFIX_REPRODUCTION_RATE | SUFFIX_ENERGY_GAIN
            )
        }),
    }
}

fn split_species_key(key: &str) -> Option<(Species, &str)> {
    Species::ALL.iter().find_map(|species| {
        key.strip_prefix(species.param_prefix())
            .and_then(|rest| rest.strip_prefix('_'))
            .map(|suffix| (*species, suffix))
    })
}

fn require_finite(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::Configuration(format!("{key} must be finite, got {value}")))
    }
}

fn parse_count(key: &str, value: f64) -> Result<usize> {
    let value = require_finite(key, value)?;
    if value < 0.0 {
        return Err(Error::Configuration(format!(
            "{key} must be non-negative, got {value}"
        )));
    }
    Ok(value.trunc() as usize)
}

fn parse_energy(key: &str, value: f64) -> Result<u32> {
    let count = parse_count(key, value)?;
    u32::try_from(count)
        .map_err(|_| Error::Configuration(format!("{key} is too large, got {value}")))
}

fn parse_rate(key: &str, value: f64) -> Result<f64> {
    let value = require_finite(key, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::Configuration(format!(
            "{key} must be between 0 and 1, got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = LifeConfig::default();
        assert_eq!(config.grid_rows, 10);
        assert_eq!(config.grid_cols, 10);
        assert_eq!(config.energy_step_decrease, 1);
        assert_eq!(config.max_iterations, None);
        for species in Species::ALL {
            let species_config = config.species(species);
            assert_eq!(species_config.initial_count, 5);
            assert_eq!(species_config.initial_energy, 10);
            assert_eq!(species_config.energy_gain, 2);
            assert!((species_config.reproduction_rate - 0.33).abs() < 1e-9);
        }
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_population(), 15);
    }

    #[test]
    fn test_empty_params_give_defaults() {
        let config = LifeConfig::from_params(&HashMap::new()).unwrap();
        assert_eq!(config, LifeConfig::default());
    }

    #[test]
    fn test_params_override_fields() {
        let config = LifeConfig::from_params(&params(&[
            ("grid_rows", 7.0),
            ("grid_cols", 12.0),
            ("primary_count", 3.0),
            ("secondary_initial_energy", 40.0),
            ("producer_reproduction_rate", 0.5),
            ("secondary_energy_gain", 6.0),
            ("energy_step_decrease", 2.0),
            ("max_iterations", 500.0),
            ("seed", 99.0),
        ]))
        .unwrap();

        assert_eq!(config.grid_rows, 7);
        assert_eq!(config.grid_cols, 12);
        assert_eq!(config.primary.initial_count, 3);
        assert_eq!(config.secondary.initial_energy, 40);
        assert!((config.producer.reproduction_rate - 0.5).abs() < 1e-9);
        assert_eq!(config.secondary.energy_gain, 6);
        assert_eq!(config.energy_step_decrease, 2);
        assert_eq!(config.max_iterations, Some(500));
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = LifeConfig::from_params(&params(&[
            ("frequency", 30.0),
            ("primary_speed", 4.0),
        ]))
        .unwrap();
        assert_eq!(config, LifeConfig::default());
    }

    #[test]
    fn test_negative_max_iterations_means_unbounded() {
        let config = LifeConfig::from_params(&params(&[("max_iterations", -1.0)])).unwrap();
        assert_eq!(config.max_iterations, None);
    }

    #[test]
    fn test_integer_params_truncate() {
        let config = LifeConfig::from_params(&params(&[("grid_rows", 8.9)])).unwrap();
        assert_eq!(config.grid_rows, 8);
    }

    #[test]
    fn test_negative_values_rejected() {
        for key in [
            "grid_rows",
            "grid_cols",
            "producer_count",
            "primary_initial_energy",
            "secondary_energy_gain",
            "energy_step_decrease",
        ] {
            let result = LifeConfig::from_params(&params(&[(key, -1.0)]));
            assert!(
                matches!(result, Err(Error::Configuration(_))),
                "{key} accepted a negative value"
            );
        }
    }

    #[test]
    fn test_rates_out_of_range_rejected() {
        for value in [-0.01, 1.01, 42.0, f64::NAN, f64::INFINITY] {
            for species in Species::ALL {
                let key = species_key(species, SUFFIX_REPRODUCTION_RATE);
                let result = LifeConfig::from_params(&params(&[(key.as_str(), value)]));
                assert!(matches!(result, Err(Error::Configuration(_))));
            }
        }
    }

    #[test]
    fn test_rate_bounds_inclusive() {
        let config = LifeConfig::from_params(&params(&[
            ("primary_reproduction_rate", 0.0),
            ("secondary_reproduction_rate", 1.0),
        ]))
        .unwrap();
        assert_eq!(config.primary.reproduction_rate, 0.0);
        assert_eq!(config.secondary.reproduction_rate, 1.0);
    }

    #[test]
    fn test_zero_energy_with_agents_rejected() {
        let result = LifeConfig::from_params(&params(&[("primary_initial_energy", 0.0)]));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let config = LifeConfig::from_params(&params(&[
            ("primary_initial_energy", 0.0),
            ("primary_count", 0.0),
        ]))
        .unwrap();
        assert_eq!(config.primary.initial_energy, 0);
    }

    #[test]
    fn test_empty_grid_requires_empty_population() {
        let result = LifeConfig::from_params(&params(&[("grid_rows", 0.0)]));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let config = LifeConfig::from_params(&params(&[
            ("grid_rows", 0.0),
            ("producer_count", 0.0),
            ("primary_count", 0.0),
            ("secondary_count", 0.0),
        ]))
        .unwrap();
        assert_eq!(config.initial_population(), 0);
    }

    #[test]
    fn test_producers_must_fit_one_per_cell() {
        let result = LifeConfig::from_params(&params(&[
            ("grid_rows", 2.0),
            ("grid_cols", 2.0),
            ("producer_count", 5.0),
        ]));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_grid_size_bounded() {
        let result = LifeConfig::from_params(&params(&[
            ("grid_rows", 2e9),
            ("grid_cols", 2e9),
            ("producer_count", 0.0),
            ("primary_count", 0.0),
            ("secondary_count", 0.0),
        ]));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let mut config = LifeConfig::default();
        config.grid_rows = MAX_CELLS;
        config.grid_cols = 1;
        assert!(config.validate().is_ok());

        config.grid_cols = 2;
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        config.grid_rows = usize::MAX;
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_to_params_round_trip() {
        let mut config = LifeConfig::default();
        config.grid_rows = 4;
        config.secondary.reproduction_rate = 0.125;
        config.max_iterations = Some(20);
        config.seed = Some(3);

        let restored = LifeConfig::from_params(&config.to_params()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_is_param_key() {
        assert!(is_param_key("grid_rows"));
        assert!(is_param_key("secondary_energy_gain"));
        assert!(!is_param_key("secondary_speed"));
        assert!(!is_param_key("wolf_count"));
    }

    #[test]
    fn test_from_json_str() {
        let config = LifeConfig::from_json_str(
            r#"{"grid_rows": 6, "primary_reproduction_rate": 0.25, "title": "demo"}"#,
        )
        .unwrap();
        assert_eq!(config.grid_rows, 6);
        assert_eq!(config.primary.reproduction_rate, 0.25);

        let result = LifeConfig::from_json_str(r#"{"grid_rows": "six"}"#);
        assert!(matches!(result, Err(Error::Configuration(_))));

        let result = LifeConfig::from_json_str("[1, 2]");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = LifeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: LifeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
