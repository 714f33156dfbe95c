//! Configuration for the evolution engine.
//!
//! YAML configuration files with sensible defaults, mirrored by `Default`
//! impls so everything also works without a file on disk.

use crate::graph::MutationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub population: PopulationConfig,
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub mutation: MutationConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network shape configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of input (constant) nodes
    pub num_inputs: usize,
    /// Number of output nodes
    pub num_outputs: usize,
}

/// Population sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Population size the refill phase restores
    pub size: usize,
    /// Survivor count K for truncation selection
    pub survivors: usize,
}

/// Generational loop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Generation budget
    pub epochs: usize,
    /// Chance that a network is ranked on raw error, ignoring size
    pub explore_rate: f64,
    /// Chance that a surviving original is lightly mutated in place
    pub survivor_mutation_rate: f64,
    /// Generations between population-wide dedup/prune sweeps
    pub prune_interval: usize,
}

/// Resource sizing and reproducibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Worker threads for fitness evaluation; 0 picks the rayon default
    pub workers: usize,
    /// Seed for the mutation rng; random when absent
    pub seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Generations between stats log lines
    pub stats_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            population: PopulationConfig::default(),
            evolution: EvolutionConfig::default(),
            mutation: MutationConfig::default(),
            runtime: RuntimeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            num_inputs: 2,
            num_outputs: 1,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 64,
            survivors: 16,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            explore_rate: 0.05,
            survivor_mutation_rate: 0.25,
            prune_interval: 10,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 10,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.network.num_inputs == 0 || self.network.num_outputs == 0 {
            return Err("network inputs/outputs must be > 0".to_string());
        }
        if self.population.size == 0 {
            return Err("population size must be > 0".to_string());
        }
        if self.population.survivors == 0 || self.population.survivors > self.population.size {
            return Err("survivors must be between 1 and the population size".to_string());
        }
        if self.evolution.epochs == 0 {
            return Err("epochs must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.evolution.explore_rate) {
            return Err("explore_rate must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.evolution.survivor_mutation_rate) {
            return Err("survivor_mutation_rate must be in [0, 1]".to_string());
        }
        if self.mutation.max_mutations == 0 {
            return Err("max_mutations must be > 0".to_string());
        }
        if self.mutation.add_edge_weight <= 0.0 {
            return Err("add_edge_weight must be > 0".to_string());
        }
        if self.logging.stats_interval == 0 {
            return Err("stats_interval must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.population.size, loaded.population.size);
        assert_eq!(config.evolution.explore_rate, loaded.evolution.explore_rate);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut config = Config::default();
        config.population.survivors = config.population.size + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.network.num_inputs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.mutation.add_edge_weight = 0.0;
        assert!(config.validate().is_err());
    }
}
