//! Lume Mixer - Preference-driven group and pair assignment for mixer events
//!
//! Participants name who they would like to meet; the engine partitions the
//! roster into gender-balanced groups (or cross-gender pairs) that maximise
//! the total preference score. An exact integer-programming solver is used
//! when available and affordable, a seeded local search otherwise.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;

// Re-export commonly used types
pub use crate::core::{Engine, ExactSolver, Grouper, GroupingError, HeuristicSolver, Partition, PreferenceGraph, SolverResult, StopReason};
pub use crate::models::{
    CreateGroupingRequest, GroupingConfig, GroupingResponse, InitialStrategy, SearchStrategy, SolverChoice,
};
