use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::core::error::GroupingError;
use crate::core::graph::PreferenceGraph;
use crate::core::matching::max_weight_pairing;
use crate::core::partition::{GroupLayout, GroupSlot, Partition};
use crate::core::result::{Engine, SolverResult, StopReason};
use crate::models::GroupingConfig;

/// Integer-programming backend handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilpBackend {
    name: &'static str,
}

/// Outcome of probing for an integer-programming backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Available(MilpBackend),
    Unavailable(String),
}

/// Report which MILP backend this build can use
pub fn probe_backend() -> Backend {
    if cfg!(feature = "milp") {
        Backend::Available(MilpBackend { name: "highs" })
    } else {
        Backend::Unavailable("built without the `milp` feature".to_string())
    }
}

impl MilpBackend {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Solve on the calling thread within `budget`
    ///
    /// The backend enforces the time limit itself. An answer that arrives
    /// after the budget is reported as a timeout so callers see one contract.
    fn solve(&self, model: GroupingModel, budget: Duration, started: Instant) -> Result<Vec<usize>, GroupingError> {
        let timeout = || GroupingError::SolverTimeout {
            budget_secs: budget.as_secs_f64(),
        };
        let remaining = budget.checked_sub(started.elapsed()).ok_or_else(timeout)?;
        if remaining.is_zero() {
            return Err(timeout());
        }

        let outcome = model.run(remaining);
        if started.elapsed() >= budget {
            debug!("{} exceeded its {:?} budget", self.name, budget);
            return match outcome {
                Err(GroupingError::Infeasible { .. }) => outcome,
                _ => Err(timeout()),
            };
        }
        outcome
    }
}

/// Self-contained assignment model
///
/// x[p][g] = 1 iff participant p sits in group g. Each scored pair gets a
/// per-group co-assignment variable bounded by both memberships, so the
/// objective counts a pair only where both members meet.
#[derive(Debug, Clone)]
struct GroupingModel {
    participants: usize,
    genders: Vec<usize>,
    slots: Vec<GroupSlot>,
    /// (a, b, score) for every pair with a positive score
    pairs: Vec<(usize, usize, f64)>,
    /// Leading slots with identical shape; their labels are interchangeable
    interchangeable: usize,
}

impl GroupingModel {
    fn build(graph: &PreferenceGraph, layout: &GroupLayout) -> Self {
        Self {
            participants: graph.len(),
            genders: graph.ids().map(|id| graph.gender(id).index()).collect(),
            slots: layout.slots().to_vec(),
            pairs: graph
                .scored_pairs()
                .into_iter()
                .map(|(a, b, score)| (a.index(), b.index(), score))
                .collect(),
            interchangeable: layout.interchangeable_prefix(),
        }
    }

    #[cfg(feature = "milp")]
    fn run(self, budget: Duration) -> Result<Vec<usize>, GroupingError> {
        use good_lp::solvers::highs::highs;
        use good_lp::*;

        let groups = self.slots.len();
        let mut vars = variables!();
        let x: Vec<Vec<Variable>> = (0..self.participants)
            .map(|_| (0..groups).map(|_| vars.add(variable().binary())).collect())
            .collect();

        let mut objective = Expression::default();
        let mut meets = Vec::with_capacity(self.pairs.len());
        for &(a, b, score) in &self.pairs {
            let y: Vec<Variable> = (0..groups)
                .map(|_| vars.add(variable().min(0.0).max(1.0)))
                .collect();
            for &var in &y {
                objective.add_mul(score, var);
            }
            meets.push((a, b, y));
        }

        let mut problem = vars
            .maximise(objective)
            .using(highs)
            .with_time_limit(budget.as_secs_f64());

        // A pair meets in at most one group, and only where both members sit
        for (a, b, y) in &meets {
            let mut once = Expression::default();
            for (g, &var) in y.iter().enumerate() {
                problem.add_constraint((var - x[*a][g]).leq(0.0));
                problem.add_constraint((var - x[*b][g]).leq(0.0));
                once.add_mul(1.0, var);
            }
            problem.add_constraint(once.leq(1.0));
        }

        for row in &x {
            let mut once = Expression::default();
            for &var in row {
                once.add_mul(1.0, var);
            }
            problem.add_constraint(once.eq(1.0));
        }

        for (g, slot) in self.slots.iter().enumerate() {
            let mut size = Expression::default();
            for row in &x {
                size.add_mul(1.0, row[g]);
            }
            problem.add_constraint(size.eq(slot.size as f64));

            if let Some(quota) = &slot.quota {
                for (gender, &want) in quota.iter().enumerate() {
                    let mut count = Expression::default();
                    for (p, row) in x.iter().enumerate() {
                        if self.genders[p] == gender {
                            count.add_mul(1.0, row[g]);
                        }
                    }
                    problem.add_constraint(count.eq(want as f64));
                }
            }
        }

        // Order interchangeable groups by their lowest member: p may only open group <= p
        for (p, row) in x.iter().enumerate() {
            for &var in row.iter().take(self.interchangeable).skip(p + 1) {
                problem.add_constraint(Expression::from(var).eq(0.0));
            }
        }

        let solution = problem.solve().map_err(|e| match e {
            ResolutionError::Infeasible => {
                GroupingError::infeasible("integer program has no feasible assignment")
            }
            other => GroupingError::Backend(other.to_string()),
        })?;

        x.iter()
            .enumerate()
            .map(|(p, row)| {
                row.iter()
                    .position(|&var| solution.value(var) > 0.5)
                    .ok_or_else(|| {
                        GroupingError::Backend(format!("participant {} left unassigned by solver", p))
                    })
            })
            .collect()
    }

    #[cfg(not(feature = "milp"))]
    fn run(self, _budget: Duration) -> Result<Vec<usize>, GroupingError> {
        Err(GroupingError::SolverUnavailable(
            "built without the `milp` feature".to_string(),
        ))
    }
}

/// Provably optimal grouping
///
/// Pairing mode is a bipartite assignment and is solved directly; every other
/// layout goes through the MILP backend.
pub struct ExactSolver<'g> {
    graph: &'g PreferenceGraph,
    config: &'g GroupingConfig,
    time_limit: Duration,
}

impl<'g> ExactSolver<'g> {
    pub fn new(graph: &'g PreferenceGraph, config: &'g GroupingConfig) -> Self {
        Self {
            graph,
            config,
            time_limit: config.time_limit,
        }
    }

    /// Override the wall-clock budget of the MILP
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn solve(&self) -> Result<SolverResult, GroupingError> {
        self.config.validate()?;
        let layout = GroupLayout::plan(self.graph, self.config)?;
        let started = Instant::now();

        let partition = if layout.is_pairing() {
            info!("Exact pairing over {} participants", self.graph.len());
            let matching = max_weight_pairing(self.graph)?;
            let pairs = matching.pairs.iter().map(|&(a, b)| vec![a, b]).collect();
            Partition::new(pairs, matching.unmatched)
        } else if layout.group_count() == 1 {
            Partition::new(vec![self.graph.ids().collect()], Vec::new())
        } else {
            let backend = match probe_backend() {
                Backend::Available(backend) => backend,
                Backend::Unavailable(reason) => {
                    warn!("Exact solver unavailable: {}", reason);
                    return Err(GroupingError::SolverUnavailable(reason));
                }
            };
            info!(
                "Exact solve with {}: {} participants, {} groups, budget {:?}",
                backend.name(),
                self.graph.len(),
                layout.group_count(),
                self.time_limit
            );

            let model = GroupingModel::build(self.graph, &layout);
            debug!(
                "Model has {} scored pairs, {} interchangeable groups",
                model.pairs.len(),
                model.interchangeable
            );
            let assignment = backend.solve(model, self.time_limit, started)?;

            let mut groups = vec![Vec::new(); layout.group_count()];
            for (id, g) in self.graph.ids().zip(assignment) {
                groups[g].push(id);
            }
            Partition::new(groups, Vec::new())
        };

        let errors = layout.validate(self.graph, &partition);
        if !errors.is_empty() {
            return Err(GroupingError::Backend(format!(
                "exact solver produced an invalid partition: {}",
                errors.join("; ")
            )));
        }

        let mut result = SolverResult::new(
            self.graph,
            partition.normalized(),
            Engine::Exact,
            StopReason::Optimal,
        );
        result.elapsed = started.elapsed();
        info!(
            "Exact solve finished: score {:.2} in {:?}",
            result.total_score, result.elapsed
        );
        Ok(result)
    }
}
