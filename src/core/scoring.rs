use serde::Serialize;

use crate::core::error::GroupingError;
use crate::core::graph::{ParticipantId, PreferenceGraph};
use crate::core::partition::Partition;

/// Pair scoring rule shared by both solvers
///
/// score = w(a->b) + w(b->a), multiplied by `mutual_bonus` when both
/// directions exist. Absent edges contribute 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringModel {
    pub mutual_bonus: f64,
}

impl ScoringModel {
    pub fn new(mutual_bonus: f64) -> Result<Self, GroupingError> {
        if !mutual_bonus.is_finite() || mutual_bonus < 1.0 {
            return Err(GroupingError::InvalidConfig(format!(
                "mutual bonus must be >= 1, got {}",
                mutual_bonus
            )));
        }
        Ok(Self { mutual_bonus })
    }

    #[inline]
    pub fn pair_score(&self, forward: f64, backward: f64) -> f64 {
        let combined = forward + backward;
        if forward > 0.0 && backward > 0.0 {
            combined * self.mutual_bonus
        } else {
            combined
        }
    }
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self { mutual_bonus: 2.0 }
    }
}

/// Rank-to-weight table for ranking mode (rank 0 is the first choice)
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityTable {
    weights: Vec<f64>,
}

impl PriorityTable {
    pub fn new(weights: Vec<f64>) -> Result<Self, GroupingError> {
        if weights.is_empty() {
            return Err(GroupingError::InvalidConfig(
                "priority weight table is empty".to_string(),
            ));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(GroupingError::InvalidConfig(format!(
                "priority weights must be positive, got {}",
                bad
            )));
        }
        Ok(Self { weights })
    }

    pub fn weight_for_rank(&self, rank: usize) -> Option<f64> {
        self.weights.get(rank).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self {
            weights: vec![2.0, 1.0],
        }
    }
}

/// Aggregate statistics for a partition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionStats {
    pub total_score: f64,
    pub avg_group_score: f64,
    pub satisfied_one_way: usize,
    pub satisfied_mutual: usize,
    pub possible_one_way: usize,
    pub possible_mutual: usize,
    pub hit_rate_one_way: f64,
    pub hit_rate_mutual: f64,
}

/// Which preference relations a partition satisfies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairDiagnostics {
    pub satisfied_mutual: Vec<(ParticipantId, ParticipantId)>,
    pub satisfied_one_way: Vec<(ParticipantId, ParticipantId)>,
    pub unmatched_mutual: Vec<(ParticipantId, ParticipantId)>,
    pub unmatched_one_way: Vec<(ParticipantId, ParticipantId)>,
}

/// Classify every mutual pair and one-directional edge by whether the
/// partition co-locates its endpoints
pub fn classify_pairs(graph: &PreferenceGraph, partition: &Partition) -> PairDiagnostics {
    let assignment = partition.assignment(graph.len());
    let together = |a: ParticipantId, b: ParticipantId| match (assignment[a.index()], assignment[b.index()]) {
        (Some(ga), Some(gb)) => ga == gb,
        _ => false,
    };

    let mut diagnostics = PairDiagnostics::default();
    for (a, b) in graph.mutual_pairs() {
        if together(a, b) {
            diagnostics.satisfied_mutual.push((a, b));
        } else {
            diagnostics.unmatched_mutual.push((a, b));
        }
    }
    for (src, dst) in graph.one_way_edges() {
        if together(src, dst) {
            diagnostics.satisfied_one_way.push((src, dst));
        } else {
            diagnostics.unmatched_one_way.push((src, dst));
        }
    }
    diagnostics
}

pub fn partition_stats(graph: &PreferenceGraph, partition: &Partition) -> PartitionStats {
    let total_score = graph.total_score(partition);
    let group_count = partition.groups().len();
    let diagnostics = classify_pairs(graph, partition);

    let satisfied_one_way = diagnostics.satisfied_one_way.len();
    let satisfied_mutual = diagnostics.satisfied_mutual.len();
    let possible_one_way = satisfied_one_way + diagnostics.unmatched_one_way.len();
    let possible_mutual = satisfied_mutual + diagnostics.unmatched_mutual.len();

    PartitionStats {
        total_score,
        avg_group_score: if group_count > 0 {
            total_score / group_count as f64
        } else {
            0.0
        },
        satisfied_one_way,
        satisfied_mutual,
        possible_one_way,
        possible_mutual,
        hit_rate_one_way: ratio(satisfied_one_way, possible_one_way),
        hit_rate_mutual: ratio(satisfied_mutual, possible_mutual),
    }
}

#[inline]
fn ratio(hit: usize, possible: usize) -> f64 {
    if possible == 0 {
        0.0
    } else {
        hit as f64 / possible as f64
    }
}
