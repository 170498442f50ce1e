use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::graph::{GraphStats, ParticipantId, PreferenceGraph};
use crate::core::partition::Partition;
use crate::core::result::{Engine, SolverResult, StopReason};
use crate::core::scoring::{classify_pairs, partition_stats, PairDiagnostics, PartitionStats};

/// One group of the returned grouping
#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub index: usize,
    pub members: Vec<String>,
    pub score: f64,
}

/// Directed or unordered participant pair, by external id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairView {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticsView {
    pub satisfied_mutual: Vec<PairView>,
    pub satisfied_one_way: Vec<PairView>,
    pub unmatched_mutual: Vec<PairView>,
    pub unmatched_one_way: Vec<PairView>,
}

impl DiagnosticsView {
    fn from_diagnostics(graph: &PreferenceGraph, diagnostics: &PairDiagnostics) -> Self {
        let view = |pairs: &[(ParticipantId, ParticipantId)]| -> Vec<PairView> {
            pairs
                .iter()
                .map(|&(a, b)| PairView {
                    first: graph.key(a).to_string(),
                    second: graph.key(b).to_string(),
                })
                .collect()
        };
        Self {
            satisfied_mutual: view(&diagnostics.satisfied_mutual),
            satisfied_one_way: view(&diagnostics.satisfied_one_way),
            unmatched_mutual: view(&diagnostics.unmatched_mutual),
            unmatched_one_way: view(&diagnostics.unmatched_one_way),
        }
    }
}

/// Response for the create grouping endpoint
#[derive(Debug, Clone, Serialize)]
pub struct GroupingResponse {
    pub run_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub engine: Engine,
    pub optimal: bool,
    pub stop_reason: StopReason,
    pub total_score: f64,
    pub groups: Vec<GroupView>,
    pub unassigned: Vec<String>,
    pub iterations: u64,
    pub restarts: usize,
    pub elapsed_ms: u64,
    pub fallback_reason: Option<String>,
    pub stats: PartitionStats,
    pub diagnostics: DiagnosticsView,
}

impl GroupingResponse {
    pub fn from_result(run_id: Uuid, graph: &PreferenceGraph, result: &SolverResult) -> Self {
        let diagnostics = classify_pairs(graph, &result.partition);
        Self {
            run_id,
            created_at: chrono::Utc::now(),
            engine: result.engine,
            optimal: result.optimal,
            stop_reason: result.stop_reason,
            total_score: result.total_score,
            groups: group_views(graph, &result.partition, &result.group_scores),
            unassigned: keys(graph, result.partition.unassigned()),
            iterations: result.iterations,
            restarts: result.restarts,
            elapsed_ms: result.elapsed.as_millis() as u64,
            fallback_reason: result.fallback_reason.clone(),
            stats: partition_stats(graph, &result.partition),
            diagnostics: DiagnosticsView::from_diagnostics(graph, &diagnostics),
        }
    }
}

/// Response for the evaluate endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResponse {
    pub valid: bool,
    pub violations: Vec<String>,
    pub total_score: f64,
    pub groups: Vec<GroupView>,
    pub graph: GraphStats,
    pub stats: PartitionStats,
    pub diagnostics: DiagnosticsView,
}

impl EvaluationResponse {
    pub fn new(graph: &PreferenceGraph, partition: &Partition, violations: Vec<String>) -> Self {
        let scores: Vec<f64> = partition
            .groups()
            .iter()
            .map(|group| graph.group_score(group))
            .collect();
        let diagnostics = classify_pairs(graph, partition);
        Self {
            valid: violations.is_empty(),
            violations,
            total_score: scores.iter().sum(),
            groups: group_views(graph, partition, &scores),
            graph: graph.stats(),
            stats: partition_stats(graph, partition),
            diagnostics: DiagnosticsView::from_diagnostics(graph, &diagnostics),
        }
    }
}

fn group_views(graph: &PreferenceGraph, partition: &Partition, scores: &[f64]) -> Vec<GroupView> {
    partition
        .groups()
        .iter()
        .zip(scores)
        .enumerate()
        .map(|(index, (group, &score))| GroupView {
            index,
            members: keys(graph, group),
            score,
        })
        .collect()
}

fn keys(graph: &PreferenceGraph, ids: &[ParticipantId]) -> Vec<String> {
    ids.iter().map(|&id| graph.key(id).to_string()).collect()
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub milp_backend: Option<String>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
