// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AnnealingSchedule, EdgeInput, GroupingConfig, InitialStrategy, ParticipantInput, RankingInput, SearchStrategy,
    SolverChoice,
};
pub use requests::{build_graph, CreateGroupingRequest, EvaluateGroupingRequest, GroupingOptions};
pub use responses::{
    DiagnosticsView, ErrorResponse, EvaluationResponse, GroupView, GroupingResponse, HealthResponse, PairView,
};
