// Integration tests for Lume Mixer

use lume_mixer::core::{
    Engine, ExactSolver, GenderSet, GroupLayout, Grouper, GroupingError, HeuristicSolver, PreferenceGraph,
    ScoringModel, StopReason,
};
use lume_mixer::models::{GroupingConfig, InitialStrategy, SolverChoice};

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

/// 12/12 roster: one weight-2 mutual pair and four one-way edges that can
/// all be co-located, so the optimum is 8 + 4 = 12
fn mixer_night() -> PreferenceGraph {
    let mut graph = roster(12, 12);
    graph.add_edge("M1", "F1", 2.0).unwrap();
    graph.add_edge("F1", "M1", 2.0).unwrap();
    graph.add_edge("M2", "F2", 1.0).unwrap();
    graph.add_edge("M3", "F3", 1.0).unwrap();
    graph.add_edge("F4", "M4", 1.0).unwrap();
    graph.add_edge("M5", "M6", 1.0).unwrap();
    graph
}

fn heuristic_config(seed: u64) -> GroupingConfig {
    GroupingConfig {
        solver: SolverChoice::Heuristic,
        seed,
        ..GroupingConfig::default()
    }
}

#[test]
fn test_integration_mixer_night_heuristic() {
    let graph = mixer_night();
    let config = heuristic_config(42);
    let result = Grouper::new(config.clone()).unwrap().solve(&graph).unwrap();

    assert_eq!(result.engine, Engine::Heuristic);
    assert_eq!(result.partition.groups().len(), 6);
    assert!(result.partition.unassigned().is_empty());

    // Every participant exactly once, every group 2 + 2
    let layout = GroupLayout::plan(&graph, &config).unwrap();
    assert!(layout.validate(&graph, &result.partition).is_empty());

    // Splitting the mutual pair is always an improving swap
    assert!(result.total_score >= 8.0);
    assert!(result.total_score <= 12.0);
    assert_eq!(result.total_score, graph.total_score(&result.partition));
    assert_eq!(result.total_score, result.group_scores.iter().sum::<f64>());
}

#[test]
fn test_integration_greedy_annealing_restarts() {
    let graph = mixer_night();
    let config = GroupingConfig {
        initial_strategy: InitialStrategy::Greedy,
        restarts: 5,
        ..heuristic_config(7)
    };
    let first = Grouper::new(config.clone()).unwrap().solve(&graph).unwrap();
    let second = Grouper::new(config.clone()).unwrap().solve(&graph).unwrap();

    assert_eq!(first.restarts, 5);
    assert_eq!(first.partition, second.partition);
    assert!(first.total_score >= 8.0);
    let layout = GroupLayout::plan(&graph, &config).unwrap();
    assert!(layout.validate(&graph, &first.partition).is_empty());
}

#[cfg(feature = "milp")]
#[test]
fn test_integration_mixer_night_exact() {
    let graph = mixer_night();
    let config = GroupingConfig {
        solver: SolverChoice::Exact,
        ..GroupingConfig::default()
    };
    let exact = Grouper::new(config.clone()).unwrap().solve(&graph).unwrap();
    assert!(exact.optimal);
    assert_eq!(exact.stop_reason, StopReason::Optimal);
    assert_eq!(exact.total_score, 12.0);

    let layout = GroupLayout::plan(&graph, &config).unwrap();
    assert!(layout.validate(&graph, &exact.partition).is_empty());

    let heuristic = HeuristicSolver::new(&graph, &heuristic_config(42)).solve().unwrap();
    assert!(exact.total_score >= heuristic.total_score);
}

#[cfg(feature = "milp")]
#[test]
fn test_integration_exact_dominates_heuristic() {
    let mut graph = roster(4, 4);
    let edges = [
        ("M1", "F2", 1.0),
        ("F2", "M1", 1.0),
        ("M2", "F1", 2.0),
        ("M3", "F1", 1.0),
        ("F3", "M4", 1.0),
        ("M4", "F3", 1.0),
        ("F4", "M2", 1.0),
        ("M1", "M3", 1.0),
    ];
    graph.extend_edges(edges).unwrap();

    let config = GroupingConfig::default();
    let exact = ExactSolver::new(&graph, &config).solve().unwrap();
    for seed in 0..5 {
        let heuristic = HeuristicSolver::new(&graph, &heuristic_config(seed)).solve().unwrap();
        assert!(exact.total_score >= heuristic.total_score);
    }
}

#[test]
fn test_integration_seed_determinism() {
    let graph = mixer_night();
    let config = GroupingConfig {
        max_iterations: 300,
        ..heuristic_config(7)
    };
    let solver = HeuristicSolver::new(&graph, &config);
    assert_eq!(solver.construct(7).unwrap(), solver.construct(7).unwrap());

    let first = solver.solve().unwrap();
    let second = solver.solve().unwrap();
    assert_eq!(first.partition, second.partition);
    assert_eq!(first.iterations, second.iterations);
}

#[test]
fn test_integration_odd_group_size_is_infeasible() {
    let graph = roster(5, 5);
    for solver in [SolverChoice::Auto, SolverChoice::Exact, SolverChoice::Heuristic] {
        let config = GroupingConfig {
            group_size: 3,
            solver,
            ..GroupingConfig::default()
        };
        let err = Grouper::new(config).unwrap().solve(&graph).unwrap_err();
        assert!(matches!(err, GroupingError::Infeasible { .. }), "{:?}: {}", solver, err);
    }
}

#[test]
fn test_integration_unbalanced_uses_ceiling_division() {
    let graph = roster(5, 5);
    let config = GroupingConfig {
        group_size: 3,
        balance_genders: false,
        ..heuristic_config(1)
    };
    let result = Grouper::new(config).unwrap().solve(&graph).unwrap();
    let sizes: Vec<usize> = result.partition.groups().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 3, 1]);
}

#[test]
fn test_integration_pairing_reports_unmatched() {
    let mut graph = roster(6, 4);
    graph.add_edge("M6", "F1", 1.0).unwrap();
    graph.add_edge("F1", "M6", 1.0).unwrap();
    graph.add_edge("M5", "F2", 1.0).unwrap();

    for solver in [SolverChoice::Auto, SolverChoice::Heuristic] {
        let config = GroupingConfig {
            pairing: true,
            solver,
            ..GroupingConfig::default()
        };
        let result = Grouper::new(config).unwrap().solve(&graph).unwrap();

        assert_eq!(result.partition.groups().len(), 4);
        assert_eq!(result.partition.unassigned().len(), 2);
        for &left_out in result.partition.unassigned() {
            assert!(graph.key(left_out).starts_with('M'));
        }
        for pair in result.partition.groups() {
            assert_ne!(graph.gender(pair[0]), graph.gender(pair[1]));
        }
        assert_eq!(result.total_score, 5.0);
    }
}
