use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::core::error::GroupingError;
use crate::core::graph::{ParticipantId, PreferenceGraph};
use crate::core::partition::{GroupLayout, Partition};
use crate::core::result::{Engine, SolverResult, StopReason};
use crate::models::{AnnealingSchedule, GroupingConfig, InitialStrategy};

/// Deltas within this band count as "no change"
const EPSILON: f64 = 1e-9;

/// Seeded construction followed by same-gender swap hill climbing
///
/// # Phases
/// 1. Shuffle each gender's roster and deal the required head count into
///    every group; surplus participants (pairing mode) go to the bench. The
///    greedy strategy deals the most wanted participants first, and in
///    pairing mode seats the highest scoring pairs first.
/// 2. With more than one restart and annealing enabled, each restart first
///    anneals: worsening swaps are taken with probability `exp(delta / T)`
///    while T cools geometrically, and the best state seen is kept.
/// 3. Sample swaps between two groups, or between a group and the bench,
///    and keep every move whose delta is non-negative. After a full pass
///    worth of samples without improvement, an exhaustive scan either finds
///    an improving swap or proves a local optimum.
pub struct HeuristicSolver<'g> {
    graph: &'g PreferenceGraph,
    config: &'g GroupingConfig,
}

struct RunOutcome {
    partition: Partition,
    score: f64,
    stop: StopReason,
    iterations: u64,
}

impl<'g> HeuristicSolver<'g> {
    pub fn new(graph: &'g PreferenceGraph, config: &'g GroupingConfig) -> Self {
        Self { graph, config }
    }

    pub fn solve(&self) -> Result<SolverResult, GroupingError> {
        self.config.validate()?;
        let layout = GroupLayout::plan(self.graph, self.config)?;
        let started = Instant::now();
        let restarts = self.config.restarts;

        info!(
            "Heuristic solve: {} participants, {} groups, {} restart(s)",
            self.graph.len(),
            layout.group_count(),
            restarts
        );

        let runs: Vec<RunOutcome> = if restarts == 1 {
            vec![self.run(&layout, self.config.seed, started)]
        } else {
            let layout = &layout;
            thread::scope(|scope| {
                let handles: Vec<_> = (0..restarts)
                    .map(|r| {
                        let seed = self.config.seed.wrapping_add(r as u64);
                        scope.spawn(move || self.run(layout, seed, started))
                    })
                    .collect();
                handles
                    .into_iter()
                    .enumerate()
                    .filter_map(|(r, handle)| match handle.join() {
                        Ok(run) => Some(run),
                        Err(_) => {
                            warn!("Heuristic restart {} panicked, discarding it", r);
                            None
                        }
                    })
                    .collect()
            })
        };

        let iterations = runs.iter().map(|run| run.iterations).sum();
        let mut best: Option<RunOutcome> = None;
        for run in runs {
            match &best {
                Some(current) if run.score <= current.score => {}
                _ => best = Some(run),
            }
        }
        let Some(best) = best else {
            return Err(GroupingError::Backend("every heuristic restart failed".to_string()));
        };

        let errors = layout.validate(self.graph, &best.partition);
        if !errors.is_empty() {
            return Err(GroupingError::Backend(format!(
                "heuristic produced an invalid partition: {}",
                errors.join("; ")
            )));
        }

        let mut result = SolverResult::new(
            self.graph,
            best.partition.normalized(),
            Engine::Heuristic,
            best.stop,
        );
        result.iterations = iterations;
        result.restarts = restarts;
        result.elapsed = started.elapsed();

        info!(
            "Heuristic finished: score {:.2}, stop {:?}, {} iterations in {:?}",
            result.total_score, result.stop_reason, result.iterations, result.elapsed
        );
        Ok(result)
    }

    fn run(&self, layout: &GroupLayout, seed: u64, started: Instant) -> RunOutcome {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = SearchState::construct(self.graph, layout, self.config.initial_strategy, &mut rng);
        debug!("Restart seed {}: initial score {:.2}", seed, state.score());

        let budget = Budget {
            max_iterations: self.config.max_iterations,
            time_limit: self.config.time_limit,
            started,
        };
        let mut annealed = None;
        let mut iterations = 0;
        if self.config.anneals() {
            let (cut, spent) = state.anneal(&mut rng, &self.config.annealing, budget);
            debug!("Restart seed {}: annealed to {:.2} in {} iterations", seed, state.score(), spent);
            annealed = cut;
            iterations = spent;
        }
        let (stop, iterations) = match annealed {
            Some(stop) => (stop, iterations),
            None => state.improve(&mut rng, budget, iterations),
        };
        debug!(
            "Restart seed {}: final score {:.2} after {} iterations ({:?})",
            seed,
            state.score(),
            iterations,
            stop
        );

        RunOutcome {
            score: state.score(),
            partition: state.into_partition(),
            stop,
            iterations,
        }
    }

    /// Initial partition for a seed, before any improvement
    pub fn construct(&self, seed: u64) -> Result<Partition, GroupingError> {
        let layout = GroupLayout::plan(self.graph, self.config)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(SearchState::construct(self.graph, &layout, self.config.initial_strategy, &mut rng).into_partition())
    }
}

/// Iteration and wall-clock limits shared by every phase of a run
#[derive(Debug, Clone, Copy)]
struct Budget {
    max_iterations: u64,
    time_limit: Duration,
    started: Instant,
}

impl Budget {
    fn exhausted(&self, iterations: u64) -> Option<StopReason> {
        if iterations >= self.max_iterations {
            Some(StopReason::IterationLimit)
        } else if self.started.elapsed() >= self.time_limit {
            Some(StopReason::TimeLimit)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Group { group: usize, index: usize },
    Bench { index: usize },
}

#[derive(Debug, Clone, Copy)]
struct Swap {
    a: ParticipantId,
    b: ParticipantId,
}

/// Group scores after a swap, plus the total change
struct Evaluation {
    delta: f64,
    updates: [Option<(usize, f64)>; 2],
}

struct Snapshot {
    groups: Vec<Vec<ParticipantId>>,
    bench: Vec<ParticipantId>,
    scores: Vec<f64>,
}

struct SearchState<'g> {
    graph: &'g PreferenceGraph,
    groups: Vec<Vec<ParticipantId>>,
    bench: Vec<ParticipantId>,
    scores: Vec<f64>,
    locations: Vec<Location>,
    /// Swap-compatible classes: one per gender when quotas apply
    pools: Vec<Vec<ParticipantId>>,
    pool_of: Vec<usize>,
    everyone: Vec<ParticipantId>,
}

impl<'g> SearchState<'g> {
    fn construct(
        graph: &'g PreferenceGraph,
        layout: &GroupLayout,
        strategy: InitialStrategy,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let pools: Vec<Vec<ParticipantId>> = if layout.has_quotas() {
            graph.genders().ids().map(|g| graph.members_of(g)).collect()
        } else {
            vec![graph.ids().collect()]
        };

        // Shuffled first so greedy ties still vary with the seed
        let mut decks = pools.clone();
        for deck in &mut decks {
            deck.shuffle(rng);
        }
        let (groups, bench) = match strategy {
            InitialStrategy::Random => deal(layout, &decks),
            InitialStrategy::Greedy if layout.is_pairing() => greedy_pairs(graph, layout, &decks),
            InitialStrategy::Greedy => {
                rank_by_demand(graph, &mut decks, layout.has_quotas());
                deal(layout, &decks)
            }
        };

        let mut pool_of = vec![0usize; graph.len()];
        for (p, pool) in pools.iter().enumerate() {
            for member in pool {
                pool_of[member.index()] = p;
            }
        }

        let scores = groups.iter().map(|group| graph.group_score(group)).collect();
        let mut state = Self {
            graph,
            groups,
            bench,
            scores,
            locations: vec![Location::Bench { index: 0 }; graph.len()],
            pools,
            pool_of,
            everyone: graph.ids().collect(),
        };
        state.index_locations();
        state
    }

    fn index_locations(&mut self) {
        for (g, group) in self.groups.iter().enumerate() {
            for (i, member) in group.iter().enumerate() {
                self.locations[member.index()] = Location::Group { group: g, index: i };
            }
        }
        for (i, member) in self.bench.iter().enumerate() {
            self.locations[member.index()] = Location::Bench { index: i };
        }
    }

    fn score(&self) -> f64 {
        self.scores.iter().sum()
    }

    fn into_partition(self) -> Partition {
        Partition::new(self.groups, self.bench)
    }

    /// Number of same-pool participant pairs, i.e. one full pass of moves
    fn pass_len(&self) -> u64 {
        self.pools
            .iter()
            .map(|pool| {
                let n = pool.len() as u64;
                n * n.saturating_sub(1) / 2
            })
            .sum()
    }

    fn improve(&mut self, rng: &mut ChaCha8Rng, budget: Budget, spent: u64) -> (StopReason, u64) {
        let pass_len = self.pass_len();
        let mut iterations = spent;
        let mut stale = 0u64;

        if pass_len == 0 {
            return (StopReason::LocalOptimum, iterations);
        }

        loop {
            if let Some(stop) = budget.exhausted(iterations) {
                return (stop, iterations);
            }
            iterations += 1;

            let mut improved = false;
            let swap = self.sample(rng);
            if let Some(eval) = self.evaluate(swap) {
                if eval.delta >= -EPSILON {
                    improved = eval.delta > EPSILON;
                    self.apply(swap, &eval);
                }
            }

            if improved {
                stale = 0;
                continue;
            }
            stale += 1;
            if stale >= pass_len {
                match self.find_improving() {
                    Some((swap, eval)) => {
                        self.apply(swap, &eval);
                        stale = 0;
                    }
                    None => return (StopReason::LocalOptimum, iterations),
                }
            }
        }
    }

    /// Anneal until the schedule cools down, then restore the best state seen
    ///
    /// Returns the stop reason when the budget ran out first.
    fn anneal(
        &mut self,
        rng: &mut ChaCha8Rng,
        schedule: &AnnealingSchedule,
        budget: Budget,
    ) -> (Option<StopReason>, u64) {
        let mut iterations = 0u64;
        if self.pass_len() == 0 {
            return (None, iterations);
        }

        let mut best = self.snapshot();
        let mut best_score = self.score();
        let mut temperature = schedule.start_temperature;
        let mut cut = None;

        while temperature > schedule.end_temperature {
            if let Some(stop) = budget.exhausted(iterations) {
                cut = Some(stop);
                break;
            }
            iterations += 1;

            let swap = self.sample(rng);
            if let Some(eval) = self.evaluate(swap) {
                let accept = eval.delta >= -EPSILON || rng.gen::<f64>() < (eval.delta / temperature).exp();
                if accept {
                    self.apply(swap, &eval);
                    let score = self.score();
                    if score > best_score + EPSILON {
                        best_score = score;
                        best = self.snapshot();
                    }
                }
            }
            temperature *= schedule.cooling_rate;
        }

        self.restore(best);
        (cut, iterations)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            groups: self.groups.clone(),
            bench: self.bench.clone(),
            scores: self.scores.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.groups = snapshot.groups;
        self.bench = snapshot.bench;
        self.scores = snapshot.scores;
        self.index_locations();
    }

    fn sample(&self, rng: &mut ChaCha8Rng) -> Swap {
        let a = self.everyone[rng.gen_range(0..self.everyone.len())];
        let pool = &self.pools[self.pool_of[a.index()]];
        let b = pool[rng.gen_range(0..pool.len())];
        Swap { a, b }
    }

    /// First improving swap in deterministic scan order
    fn find_improving(&self) -> Option<(Swap, Evaluation)> {
        for pool in &self.pools {
            for (i, &a) in pool.iter().enumerate() {
                for &b in &pool[i + 1..] {
                    let swap = Swap { a, b };
                    if let Some(eval) = self.evaluate(swap) {
                        if eval.delta > EPSILON {
                            return Some((swap, eval));
                        }
                    }
                }
            }
        }
        None
    }

    /// Score change of a swap, `None` when the swap is a no-op
    fn evaluate(&self, swap: Swap) -> Option<Evaluation> {
        let (la, lb) = (self.locations[swap.a.index()], self.locations[swap.b.index()]);
        match (la, lb) {
            (Location::Group { group: ga, index: ia }, Location::Group { group: gb, index: ib }) => {
                if ga == gb {
                    return None;
                }
                let new_a = self.score_with(ga, ia, swap.b);
                let new_b = self.score_with(gb, ib, swap.a);
                Some(Evaluation {
                    delta: (new_a - self.scores[ga]) + (new_b - self.scores[gb]),
                    updates: [Some((ga, new_a)), Some((gb, new_b))],
                })
            }
            (Location::Group { group, index }, Location::Bench { .. }) => {
                let new = self.score_with(group, index, swap.b);
                Some(Evaluation {
                    delta: new - self.scores[group],
                    updates: [Some((group, new)), None],
                })
            }
            (Location::Bench { .. }, Location::Group { group, index }) => {
                let new = self.score_with(group, index, swap.a);
                Some(Evaluation {
                    delta: new - self.scores[group],
                    updates: [Some((group, new)), None],
                })
            }
            (Location::Bench { .. }, Location::Bench { .. }) => None,
        }
    }

    /// Group score with the member at `index` replaced
    fn score_with(&self, group: usize, index: usize, replacement: ParticipantId) -> f64 {
        let members = &self.groups[group];
        let member_at = |i: usize| if i == index { replacement } else { members[i] };
        let mut score = 0.0;
        for i in 0..members.len() {
            for j in i + 1..members.len() {
                score += self.graph.pair_score(member_at(i), member_at(j));
            }
        }
        score
    }

    fn apply(&mut self, swap: Swap, eval: &Evaluation) {
        let (la, lb) = (self.locations[swap.a.index()], self.locations[swap.b.index()]);
        self.put(lb, swap.a);
        self.put(la, swap.b);
        self.locations[swap.a.index()] = lb;
        self.locations[swap.b.index()] = la;
        for (group, score) in eval.updates.iter().flatten() {
            self.scores[*group] = *score;
        }
    }

    fn put(&mut self, location: Location, member: ParticipantId) {
        match location {
            Location::Group { group, index } => self.groups[group][index] = member,
            Location::Bench { index } => self.bench[index] = member,
        }
    }
}

/// Fill every slot from the decks in order; leftovers go to the bench
fn deal(layout: &GroupLayout, decks: &[Vec<ParticipantId>]) -> (Vec<Vec<ParticipantId>>, Vec<ParticipantId>) {
    let mut groups = Vec::with_capacity(layout.group_count());
    let mut cursors = vec![0usize; decks.len()];

    for slot in layout.slots() {
        let mut group = Vec::with_capacity(slot.size);
        match &slot.quota {
            Some(quota) => {
                for (pool, &want) in quota.iter().enumerate() {
                    let start = cursors[pool];
                    group.extend_from_slice(&decks[pool][start..start + want]);
                    cursors[pool] += want;
                }
            }
            None => {
                let start = cursors[0];
                group.extend_from_slice(&decks[0][start..start + slot.size]);
                cursors[0] += slot.size;
            }
        }
        groups.push(group);
    }

    let mut bench = Vec::new();
    for (deck, &cursor) in decks.iter().zip(&cursors) {
        bench.extend_from_slice(&deck[cursor..]);
    }
    (groups, bench)
}

/// Stable sort, most wanted first
///
/// Within a gender quota the key is the out-degree. Without quotas it is the
/// in-degree plus half the out-degree, so popular targets spread first.
fn rank_by_demand(graph: &PreferenceGraph, decks: &mut [Vec<ParticipantId>], quotas: bool) {
    let mut in_degree = vec![0usize; graph.len()];
    for id in graph.ids() {
        for target in graph.targets_of(id) {
            in_degree[target.index()] += 1;
        }
    }
    let demand = |id: &ParticipantId| {
        let out = graph.targets_of(*id).len() as f64;
        if quotas {
            out
        } else {
            in_degree[id.index()] as f64 + 0.5 * out
        }
    };
    for deck in decks {
        deck.sort_by(|a, b| demand(b).total_cmp(&demand(a)));
    }
}

/// Seat the highest scoring cross-gender pairs first, then pair the rest in deck order
fn greedy_pairs(
    graph: &PreferenceGraph,
    layout: &GroupLayout,
    decks: &[Vec<ParticipantId>],
) -> (Vec<Vec<ParticipantId>>, Vec<ParticipantId>) {
    let wanted = layout.group_count();
    let mut candidates = Vec::new();
    for &a in &decks[0] {
        for &b in &decks[1] {
            let score = graph.pair_score(a, b);
            if score > 0.0 {
                candidates.push((a, b, score));
            }
        }
    }
    candidates.sort_by(|x, y| y.2.total_cmp(&x.2));

    let mut taken = vec![false; graph.len()];
    let mut pairs = Vec::with_capacity(wanted);
    for (a, b, _) in candidates {
        if pairs.len() == wanted {
            break;
        }
        if !taken[a.index()] && !taken[b.index()] {
            taken[a.index()] = true;
            taken[b.index()] = true;
            pairs.push(vec![a, b]);
        }
    }

    let free = |deck: &[ParticipantId]| -> Vec<ParticipantId> {
        deck.iter().copied().filter(|id| !taken[id.index()]).collect()
    };
    let (left, right) = (free(&decks[0]), free(&decks[1]));
    let fill = wanted - pairs.len();
    pairs.extend(left.iter().zip(&right).take(fill).map(|(&a, &b)| vec![a, b]));
    let bench = left.into_iter().skip(fill).chain(right.into_iter().skip(fill)).collect();
    (pairs, bench)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::GenderSet;
    use crate::core::scoring::ScoringModel;

    fn roster(males: usize, females: usize) -> PreferenceGraph {
        let mut graph = PreferenceGraph::new(GenderSet::default(), ScoringModel::default());
        for i in 1..=males {
            graph.add_participant(format!("M{}", i), "male").unwrap();
        }
        for i in 1..=females {
            graph.add_participant(format!("F{}", i), "female").unwrap();
        }
        graph
    }

    fn mutual(graph: &mut PreferenceGraph, a: &str, b: &str) {
        graph.add_edge(a, b, 1.0).unwrap();
        graph.add_edge(b, a, 1.0).unwrap();
    }

    #[test]
    fn test_construction_is_seeded_and_valid() {
        let graph = roster(6, 6);
        let config = GroupingConfig::default();
        let solver = HeuristicSolver::new(&graph, &config);
        let layout = GroupLayout::plan(&graph, &config).unwrap();

        let first = solver.construct(7).unwrap();
        let again = solver.construct(7).unwrap();
        assert_eq!(first, again);
        assert!(layout.validate(&graph, &first).is_empty());
    }

    #[test]
    fn test_reaches_planted_optimum() {
        let mut graph = roster(4, 4);
        mutual(&mut graph, "M1", "F1");
        mutual(&mut graph, "M2", "F2");
        graph.add_edge("M3", "F3", 1.0).unwrap();

        let config = GroupingConfig::default();
        let result = HeuristicSolver::new(&graph, &config).solve().unwrap();

        assert_eq!(result.total_score, 9.0);
        assert_eq!(result.engine, Engine::Heuristic);
        assert!(!result.optimal);
        assert_eq!(result.stop_reason, StopReason::LocalOptimum);
        assert!(result.reached_local_optimum());
    }

    #[test]
    fn test_reports_exhausted_budget() {
        let mut graph = roster(6, 6);
        mutual(&mut graph, "M1", "F1");
        let config = GroupingConfig {
            max_iterations: 0,
            ..GroupingConfig::default()
        };
        let result = HeuristicSolver::new(&graph, &config).solve().unwrap();
        assert_eq!(result.stop_reason, StopReason::IterationLimit);
        assert!(!result.reached_local_optimum());

        let layout = GroupLayout::plan(&graph, &config).unwrap();
        assert!(layout.validate(&graph, &result.partition).is_empty());
    }

    #[test]
    fn test_pairing_benches_surplus() {
        let mut graph = roster(6, 4);
        mutual(&mut graph, "M5", "F1");
        mutual(&mut graph, "M6", "F2");
        let config = GroupingConfig {
            pairing: true,
            ..GroupingConfig::default()
        };
        let result = HeuristicSolver::new(&graph, &config).solve().unwrap();

        assert_eq!(result.partition.groups().len(), 4);
        assert_eq!(result.partition.unassigned().len(), 2);
        assert_eq!(result.total_score, 8.0);
        for pair in result.partition.groups() {
            assert_ne!(graph.gender(pair[0]), graph.gender(pair[1]));
        }
    }

    #[test]
    fn test_restarts_are_deterministic() {
        let mut graph = roster(8, 8);
        for i in 1..=8 {
            graph.add_edge(&format!("M{}", i), &format!("F{}", 9 - i), 1.0).unwrap();
        }
        mutual(&mut graph, "M1", "F1");
        let config = GroupingConfig {
            restarts: 4,
            max_iterations: 500,
            ..GroupingConfig::default()
        };

        let first = HeuristicSolver::new(&graph, &config).solve().unwrap();
        let second = HeuristicSolver::new(&graph, &config).solve().unwrap();
        assert_eq!(first.partition, second.partition);
        assert_eq!(first.total_score, second.total_score);
        assert_eq!(first.restarts, 4);
    }

    #[test]
    fn test_greedy_deals_most_active_first() {
        let mut graph = roster(4, 4);
        for (src, targets) in [
            ("M1", &["F1", "F2", "F3"][..]),
            ("M2", &["F1", "F2"][..]),
            ("M3", &["F1"][..]),
            ("F1", &["M1", "M2", "M3"][..]),
            ("F2", &["M1", "M2"][..]),
            ("F3", &["M1"][..]),
        ] {
            for target in targets {
                graph.add_edge(src, target, 1.0).unwrap();
            }
        }
        let config = GroupingConfig {
            initial_strategy: InitialStrategy::Greedy,
            ..GroupingConfig::default()
        };
        let solver = HeuristicSolver::new(&graph, &config);

        for seed in [1, 2, 3] {
            let partition = solver.construct(seed).unwrap();
            let mut first: Vec<&str> = partition.groups()[0].iter().map(|&id| graph.key(id)).collect();
            first.sort_unstable();
            assert_eq!(first, vec!["F1", "F2", "M1", "M2"]);
        }
    }

    #[test]
    fn test_greedy_without_quotas_spreads_popular_targets() {
        let mut graph = roster(2, 2);
        for src in ["M1", "M2", "F2"] {
            graph.add_edge(src, "F1", 1.0).unwrap();
        }
        let config = GroupingConfig {
            group_size: 2,
            balance_genders: false,
            initial_strategy: InitialStrategy::Greedy,
            ..GroupingConfig::default()
        };
        let partition = HeuristicSolver::new(&graph, &config).construct(9).unwrap();
        let f1 = graph.id("F1").unwrap();
        assert_eq!(partition.groups()[0][0], f1);
    }

    #[test]
    fn test_greedy_pairing_seats_strongest_pairs() {
        let mut graph = roster(3, 2);
        mutual(&mut graph, "M3", "F1");
        graph.add_edge("M1", "F2", 1.0).unwrap();
        let config = GroupingConfig {
            pairing: true,
            initial_strategy: InitialStrategy::Greedy,
            ..GroupingConfig::default()
        };
        let partition = HeuristicSolver::new(&graph, &config).construct(5).unwrap();
        let id = |key: &str| graph.id(key).unwrap();

        assert_eq!(partition.groups(), &[vec![id("M3"), id("F1")], vec![id("M1"), id("F2")]]);
        assert_eq!(partition.unassigned(), &[id("M2")]);
        assert_eq!(graph.total_score(&partition), 5.0);
    }

    #[test]
    fn test_annealing_restarts_reach_planted_optimum() {
        let mut graph = roster(4, 4);
        mutual(&mut graph, "M1", "F1");
        mutual(&mut graph, "M2", "F2");
        graph.add_edge("M3", "F3", 1.0).unwrap();

        let config = GroupingConfig {
            restarts: 3,
            ..GroupingConfig::default()
        };
        assert!(config.anneals());
        let first = HeuristicSolver::new(&graph, &config).solve().unwrap();
        let second = HeuristicSolver::new(&graph, &config).solve().unwrap();

        assert_eq!(first.total_score, 9.0);
        assert_eq!(first.stop_reason, StopReason::LocalOptimum);
        assert_eq!(first.partition, second.partition);
    }

    #[test]
    fn test_stops_on_time_limit() {
        let mut graph = roster(20, 20);
        for i in 1..=20 {
            for j in 1..=20 {
                if (i + j) % 3 == 0 {
                    graph.add_edge(&format!("M{}", i), &format!("F{}", j), 1.0).unwrap();
                }
            }
        }
        let config = GroupingConfig {
            time_limit: Duration::from_nanos(1),
            max_iterations: u64::MAX,
            ..GroupingConfig::default()
        };
        let result = HeuristicSolver::new(&graph, &config).solve().unwrap();
        assert_eq!(result.stop_reason, StopReason::TimeLimit);
        assert!(!result.reached_local_optimum());

        let layout = GroupLayout::plan(&graph, &config).unwrap();
        assert!(layout.validate(&graph, &result.partition).is_empty());
    }

    #[test]
    fn test_infeasible_config_is_an_error() {
        let graph = roster(5, 5);
        let config = GroupingConfig {
            group_size: 3,
            ..GroupingConfig::default()
        };
        let err = HeuristicSolver::new(&graph, &config).solve().unwrap_err();
        assert!(matches!(err, GroupingError::Infeasible { .. }));
    }
}
