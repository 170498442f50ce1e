use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::GroupingError;
use crate::core::graph::GenderSet;
use crate::core::scoring::{PriorityTable, ScoringModel};

/// Roster entry as supplied by the ingestion layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantInput {
    pub id: String,
    pub gender: String,
}

/// Directed preference edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeInput {
    pub source: String,
    pub target: String,
    #[serde(default = "default_edge_weight")]
    pub weight: f64,
}

fn default_edge_weight() -> f64 { 1.0 }

/// Ranked target list, first choice first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingInput {
    pub source: String,
    pub targets: Vec<String>,
}

/// Which engine produces the grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverChoice {
    Auto,
    Exact,
    Heuristic,
}

impl Default for SolverChoice {
    fn default() -> Self {
        SolverChoice::Auto
    }
}

/// How the heuristic builds its starting partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialStrategy {
    /// Seeded shuffle of each gender, dealt in order
    #[default]
    Random,
    /// Participants with the most preferences are dealt first
    Greedy,
}

/// Move acceptance rule of the heuristic
///
/// Annealing only applies to runs with more than one restart; a single run
/// always hill climbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    HillClimbing,
    #[default]
    Annealing,
}

/// Geometric cooling schedule for annealing restarts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealingSchedule {
    pub start_temperature: f64,
    pub end_temperature: f64,
    pub cooling_rate: f64,
}

impl Default for AnnealingSchedule {
    fn default() -> Self {
        Self {
            start_temperature: 10.0,
            end_temperature: 0.01,
            cooling_rate: 0.99,
        }
    }
}

impl AnnealingSchedule {
    pub fn validate(&self) -> Result<(), GroupingError> {
        let ordered = self.start_temperature > self.end_temperature && self.end_temperature > 0.0;
        if !ordered || !self.start_temperature.is_finite() {
            return Err(GroupingError::InvalidConfig(format!(
                "annealing needs start > end > 0, got {} and {}",
                self.start_temperature, self.end_temperature
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(GroupingError::InvalidConfig(format!(
                "cooling rate must lie in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        Ok(())
    }
}

/// Engine-facing grouping configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingConfig {
    pub group_size: usize,
    pub pairing: bool,
    pub balance_genders: bool,
    pub mutual_bonus: f64,
    pub priority_weights: Vec<f64>,
    pub genders: Vec<String>,
    pub solver: SolverChoice,
    pub seed: u64,
    /// Budget of an explicit exact solve and of the heuristic
    pub time_limit: Duration,
    /// Budget of the exact attempt made by the auto policy
    pub auto_exact_time_limit: Duration,
    pub max_iterations: u64,
    pub restarts: usize,
    pub initial_strategy: InitialStrategy,
    pub search: SearchStrategy,
    pub annealing: AnnealingSchedule,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            group_size: 4,
            pairing: false,
            balance_genders: true,
            mutual_bonus: 2.0,
            priority_weights: vec![2.0, 1.0],
            genders: vec!["male".to_string(), "female".to_string()],
            solver: SolverChoice::Auto,
            seed: 42,
            time_limit: Duration::from_secs(300),
            auto_exact_time_limit: Duration::from_secs(10),
            max_iterations: 10_000,
            restarts: 1,
            initial_strategy: InitialStrategy::Random,
            search: SearchStrategy::Annealing,
            annealing: AnnealingSchedule::default(),
        }
    }
}

impl GroupingConfig {
    pub fn validate(&self) -> Result<(), GroupingError> {
        if !self.pairing && self.group_size < 2 {
            return Err(GroupingError::InvalidConfig(format!(
                "group size must be at least 2, got {}",
                self.group_size
            )));
        }
        if self.time_limit.is_zero() || self.auto_exact_time_limit.is_zero() {
            return Err(GroupingError::InvalidConfig(
                "time limits must be positive".to_string(),
            ));
        }
        if self.restarts == 0 {
            return Err(GroupingError::InvalidConfig(
                "at least one heuristic restart is required".to_string(),
            ));
        }
        self.annealing.validate()?;
        self.scoring_model()?;
        self.priority_table()?;
        self.gender_set()?;
        Ok(())
    }

    /// Whether restarts anneal instead of hill climbing
    pub fn anneals(&self) -> bool {
        self.search == SearchStrategy::Annealing && self.restarts > 1
    }

    /// Effective group size (2 in pairing mode)
    pub fn effective_group_size(&self) -> usize {
        if self.pairing { 2 } else { self.group_size }
    }

    pub fn scoring_model(&self) -> Result<ScoringModel, GroupingError> {
        ScoringModel::new(self.mutual_bonus)
    }

    pub fn priority_table(&self) -> Result<PriorityTable, GroupingError> {
        PriorityTable::new(self.priority_weights.clone())
    }

    pub fn gender_set(&self) -> Result<GenderSet, GroupingError> {
        GenderSet::new(self.genders.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GroupingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_group_size(), 4);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = GroupingConfig { group_size: 1, ..GroupingConfig::default() };
        assert!(config.validate().is_err());

        let config = GroupingConfig { mutual_bonus: 0.9, ..GroupingConfig::default() };
        assert!(config.validate().is_err());

        let config = GroupingConfig { restarts: 0, ..GroupingConfig::default() };
        assert!(config.validate().is_err());

        let config = GroupingConfig { genders: vec![], ..GroupingConfig::default() };
        assert!(config.validate().is_err());

        let annealing = AnnealingSchedule { cooling_rate: 1.0, ..AnnealingSchedule::default() };
        let config = GroupingConfig { annealing, ..GroupingConfig::default() };
        assert!(config.validate().is_err());

        let annealing = AnnealingSchedule { end_temperature: 20.0, ..AnnealingSchedule::default() };
        let config = GroupingConfig { annealing, ..GroupingConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_annealing_needs_restarts() {
        let config = GroupingConfig::default();
        assert_eq!(config.search, SearchStrategy::Annealing);
        assert!(!config.anneals());

        let config = GroupingConfig { restarts: 5, ..GroupingConfig::default() };
        assert!(config.anneals());

        let config = GroupingConfig {
            restarts: 5,
            search: SearchStrategy::HillClimbing,
            ..GroupingConfig::default()
        };
        assert!(!config.anneals());
    }

    #[test]
    fn test_edge_weight_defaults_to_one() {
        let edge: EdgeInput = serde_json::from_str(r#"{"source":"M1","target":"F1"}"#).unwrap();
        assert_eq!(edge.weight, 1.0);
    }

    #[test]
    fn test_solver_choice_serde() {
        let choice: SolverChoice = serde_json::from_str(r#""heuristic""#).unwrap();
        assert_eq!(choice, SolverChoice::Heuristic);

        let strategy: InitialStrategy = serde_json::from_str(r#""greedy""#).unwrap();
        assert_eq!(strategy, InitialStrategy::Greedy);
        let search: SearchStrategy = serde_json::from_str(r#""hill_climbing""#).unwrap();
        assert_eq!(search, SearchStrategy::HillClimbing);
    }
}
