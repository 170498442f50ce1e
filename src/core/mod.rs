// Core algorithm exports
pub mod error;
pub mod exact;
pub mod graph;
pub mod grouper;
pub mod heuristic;
pub mod matching;
pub mod partition;
pub mod result;
pub mod scoring;

pub use error::GroupingError;
pub use exact::{probe_backend, Backend, ExactSolver, MilpBackend};
pub use graph::{GenderId, GenderSet, GraphStats, PairRelation, ParticipantId, PreferenceGraph};
pub use grouper::Grouper;
pub use heuristic::HeuristicSolver;
pub use matching::{max_weight_pairing, PairMatching};
pub use partition::{GroupLayout, GroupSlot, Partition};
pub use result::{Engine, SolverResult, StopReason};
pub use scoring::{classify_pairs, partition_stats, PairDiagnostics, PartitionStats, PriorityTable, ScoringModel};
