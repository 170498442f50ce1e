use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::graph::PreferenceGraph;
use crate::core::partition::Partition;

/// Engine that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Exact,
    Heuristic,
}

/// Why a solve stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Exact engine proved optimality
    Optimal,
    /// No improving move exists in a full pass
    LocalOptimum,
    IterationLimit,
    TimeLimit,
}

/// Partition returned by a solver, with its score breakdown
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub partition: Partition,
    pub total_score: f64,
    pub group_scores: Vec<f64>,
    pub engine: Engine,
    pub optimal: bool,
    pub stop_reason: StopReason,
    pub iterations: u64,
    pub restarts: usize,
    pub elapsed: Duration,
    /// Set when the auto policy fell back to the heuristic
    pub fallback_reason: Option<String>,
}

impl SolverResult {
    pub(crate) fn new(
        graph: &PreferenceGraph,
        partition: Partition,
        engine: Engine,
        stop_reason: StopReason,
    ) -> Self {
        let group_scores: Vec<f64> = partition
            .groups()
            .iter()
            .map(|group| graph.group_score(group))
            .collect();
        let total_score = group_scores.iter().sum();
        Self {
            partition,
            total_score,
            group_scores,
            engine,
            optimal: stop_reason == StopReason::Optimal,
            stop_reason,
            iterations: 0,
            restarts: 0,
            elapsed: Duration::ZERO,
            fallback_reason: None,
        }
    }

    /// Whether the heuristic converged before its budget ran out
    pub fn reached_local_optimum(&self) -> bool {
        matches!(self.stop_reason, StopReason::LocalOptimum | StopReason::Optimal)
    }
}
