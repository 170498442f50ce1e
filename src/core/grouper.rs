use std::time::Instant;
use tracing::{info, warn};

use crate::core::error::GroupingError;
use crate::core::exact::ExactSolver;
use crate::core::graph::PreferenceGraph;
use crate::core::heuristic::HeuristicSolver;
use crate::core::result::SolverResult;
use crate::models::{GroupingConfig, SolverChoice};

/// Entry point that applies the solver selection policy
///
/// `Auto` tries the exact engine under `auto_exact_time_limit` and falls back
/// to the heuristic when no backend exists or the budget runs out. Any other
/// exact failure, infeasibility included, is returned as is.
pub struct Grouper {
    config: GroupingConfig,
}

impl Grouper {
    pub fn new(config: GroupingConfig) -> Result<Self, GroupingError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    pub fn solve(&self, graph: &PreferenceGraph) -> Result<SolverResult, GroupingError> {
        match self.config.solver {
            SolverChoice::Exact => ExactSolver::new(graph, &self.config).solve(),
            SolverChoice::Heuristic => HeuristicSolver::new(graph, &self.config).solve(),
            SolverChoice::Auto => self.solve_auto(graph),
        }
    }

    fn solve_auto(&self, graph: &PreferenceGraph) -> Result<SolverResult, GroupingError> {
        let started = Instant::now();
        let exact = ExactSolver::new(graph, &self.config)
            .with_time_limit(self.config.auto_exact_time_limit)
            .solve();

        match exact {
            Ok(result) => Ok(result),
            Err(err) if err.is_recoverable() => {
                warn!("Falling back to heuristic: {}", err);
                let mut result = HeuristicSolver::new(graph, &self.config).solve()?;
                result.fallback_reason = Some(err.to_string());
                result.elapsed = started.elapsed();
                info!("Fallback heuristic scored {:.2}", result.total_score);
                Ok(result)
            }
            Err(err) => Err(err),
        }
    }
}
