use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::core::error::GroupingError;
use crate::core::graph::{ParticipantId, PreferenceGraph};
use crate::core::partition::Partition;
use crate::models::domain::{
    EdgeInput, GroupingConfig, InitialStrategy, ParticipantInput, RankingInput, SearchStrategy, SolverChoice,
};

/// Request to compute a grouping
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGroupingRequest {
    #[validate(length(min = 1, max = 10000))]
    pub participants: Vec<ParticipantInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
    #[serde(default)]
    pub rankings: Vec<RankingInput>,
    #[serde(default)]
    #[validate(nested)]
    pub options: GroupingOptions,
}

/// Per-request overrides of the configured grouping defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupingOptions {
    #[validate(range(min = 2, max = 1000))]
    pub group_size: Option<usize>,
    pub pairing: Option<bool>,
    pub balance_genders: Option<bool>,
    #[validate(range(min = 1.0))]
    pub mutual_bonus: Option<f64>,
    pub priority_weights: Option<Vec<f64>>,
    pub genders: Option<Vec<String>>,
    pub solver: Option<SolverChoice>,
    pub seed: Option<u64>,
    #[validate(range(exclusive_min = 0.0, max = 3600.0))]
    pub time_limit_secs: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 3600.0))]
    pub auto_exact_time_limit_secs: Option<f64>,
    pub max_iterations: Option<u64>,
    #[validate(range(min = 1, max = 64))]
    pub restarts: Option<usize>,
    pub initial_strategy: Option<InitialStrategy>,
    pub search: Option<SearchStrategy>,
    #[validate(range(exclusive_min = 0.0))]
    pub start_temperature: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub end_temperature: Option<f64>,
    #[validate(range(exclusive_min = 0.0, exclusive_max = 1.0))]
    pub cooling_rate: Option<f64>,
}

impl GroupingOptions {
    /// Overlay these options on `defaults`, field by field
    pub fn apply_to(&self, defaults: &GroupingConfig) -> Result<GroupingConfig, GroupingError> {
        let mut config = defaults.clone();
        if let Some(group_size) = self.group_size {
            config.group_size = group_size;
        }
        if let Some(pairing) = self.pairing {
            config.pairing = pairing;
        }
        if let Some(balance) = self.balance_genders {
            config.balance_genders = balance;
        }
        if let Some(bonus) = self.mutual_bonus {
            config.mutual_bonus = bonus;
        }
        if let Some(weights) = &self.priority_weights {
            config.priority_weights = weights.clone();
        }
        if let Some(genders) = &self.genders {
            config.genders = genders.clone();
        }
        if let Some(solver) = self.solver {
            config.solver = solver;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(secs) = self.time_limit_secs {
            config.time_limit = seconds(secs)?;
        }
        if let Some(secs) = self.auto_exact_time_limit_secs {
            config.auto_exact_time_limit = seconds(secs)?;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(restarts) = self.restarts {
            config.restarts = restarts;
        }
        if let Some(strategy) = self.initial_strategy {
            config.initial_strategy = strategy;
        }
        if let Some(search) = self.search {
            config.search = search;
        }
        if let Some(start) = self.start_temperature {
            config.annealing.start_temperature = start;
        }
        if let Some(end) = self.end_temperature {
            config.annealing.end_temperature = end;
        }
        if let Some(rate) = self.cooling_rate {
            config.annealing.cooling_rate = rate;
        }
        config.validate()?;
        Ok(config)
    }
}

fn seconds(secs: f64) -> Result<Duration, GroupingError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| GroupingError::InvalidConfig(format!("invalid duration {}s", secs)))
}

/// Build the preference graph described by a roster and its preferences
pub fn build_graph(
    participants: &[ParticipantInput],
    edges: &[EdgeInput],
    rankings: &[RankingInput],
    config: &GroupingConfig,
) -> Result<PreferenceGraph, GroupingError> {
    let mut graph = PreferenceGraph::new(config.gender_set()?, config.scoring_model()?);
    for participant in participants {
        graph.add_participant(participant.id.as_str(), &participant.gender)?;
    }
    graph.extend_edges(
        edges
            .iter()
            .map(|edge| (edge.source.as_str(), edge.target.as_str(), edge.weight)),
    )?;
    if !rankings.is_empty() {
        let table = config.priority_table()?;
        for ranking in rankings {
            graph.add_ranking(&ranking.source, &ranking.targets, &table)?;
        }
    }
    Ok(graph)
}

impl CreateGroupingRequest {
    pub fn build_graph(&self, config: &GroupingConfig) -> Result<PreferenceGraph, GroupingError> {
        build_graph(&self.participants, &self.edges, &self.rankings, config)
    }
}

/// Request to score and validate a grouping computed elsewhere
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvaluateGroupingRequest {
    #[validate(length(min = 1, max = 10000))]
    pub participants: Vec<ParticipantInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
    #[serde(default)]
    pub rankings: Vec<RankingInput>,
    #[validate(length(min = 1))]
    pub groups: Vec<Vec<String>>,
    #[serde(default)]
    pub unassigned: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub options: GroupingOptions,
}

impl EvaluateGroupingRequest {
    pub fn build_graph(&self, config: &GroupingConfig) -> Result<PreferenceGraph, GroupingError> {
        build_graph(&self.participants, &self.edges, &self.rankings, config)
    }

    /// Resolve the submitted ids against the graph
    pub fn partition(&self, graph: &PreferenceGraph) -> Result<Partition, GroupingError> {
        let resolve = |key: &String| -> Result<ParticipantId, GroupingError> {
            graph
                .id(key)
                .ok_or_else(|| GroupingError::InvalidConfig(format!("unknown participant {} in grouping", key)))
        };
        let groups = self
            .groups
            .iter()
            .map(|group| group.iter().map(resolve).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        let unassigned = self.unassigned.iter().map(resolve).collect::<Result<Vec<_>, _>>()?;
        Ok(Partition::new(groups, unassigned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateGroupingRequest {
        serde_json::from_str(
            r#"{
                "participants": [
                    {"id": "M1", "gender": "male"},
                    {"id": "M2", "gender": "male"},
                    {"id": "F1", "gender": "female"},
                    {"id": "F2", "gender": "female"}
                ],
                "edges": [{"source": "M1", "target": "F1"}],
                "rankings": [{"source": "F2", "targets": ["M2", "M1"]}],
                "options": {"groupSize": 2, "solver": "heuristic"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_options_override_defaults() {
        let req = request();
        assert!(req.validate().is_ok());
        let config = req.options.apply_to(&GroupingConfig::default()).unwrap();
        assert_eq!(config.group_size, 2);
        assert_eq!(config.solver, SolverChoice::Heuristic);
        assert_eq!(config.seed, GroupingConfig::default().seed);
    }

    #[test]
    fn test_build_graph_merges_edges_and_rankings() {
        let req = request();
        let config = req.options.apply_to(&GroupingConfig::default()).unwrap();
        let graph = req.build_graph(&config).unwrap();
        let id = |k: &str| graph.id(k).unwrap();
        assert_eq!(graph.edge_weight(id("M1"), id("F1")), Some(1.0));
        assert_eq!(graph.edge_weight(id("F2"), id("M2")), Some(2.0));
        assert_eq!(graph.edge_weight(id("F2"), id("M1")), Some(1.0));
    }

    #[test]
    fn test_validation_rejects_bad_options() {
        let mut req = request();
        req.options.restarts = Some(0);
        assert!(req.validate().is_err());

        let mut req = request();
        req.participants.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_search_options_override_defaults() {
        let options: GroupingOptions = serde_json::from_str(
            r#"{"restarts": 5, "initialStrategy": "greedy", "search": "annealing", "coolingRate": 0.95}"#,
        )
        .unwrap();
        assert!(options.validate().is_ok());
        let config = options.apply_to(&GroupingConfig::default()).unwrap();
        assert_eq!(config.initial_strategy, InitialStrategy::Greedy);
        assert!(config.anneals());
        assert_eq!(config.annealing.cooling_rate, 0.95);
        assert_eq!(config.annealing.start_temperature, 10.0);

        let options = GroupingOptions {
            start_temperature: Some(0.001),
            ..GroupingOptions::default()
        };
        assert!(options.apply_to(&GroupingConfig::default()).is_err());
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        let options = GroupingOptions {
            time_limit_secs: Some(-1.0),
            ..GroupingOptions::default()
        };
        assert!(options.apply_to(&GroupingConfig::default()).is_err());
    }

    #[test]
    fn test_evaluate_resolves_ids() {
        let req: EvaluateGroupingRequest = serde_json::from_str(
            r#"{
                "participants": [
                    {"id": "M1", "gender": "male"},
                    {"id": "F1", "gender": "female"}
                ],
                "groups": [["M1", "X9"]]
            }"#,
        )
        .unwrap();
        let config = GroupingConfig::default();
        let graph = req.build_graph(&config).unwrap();
        assert!(req.partition(&graph).is_err());
    }
}
