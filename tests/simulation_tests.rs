//! Tests for the simulation driver, observers and report export

mod common;

use std::{
    fs,
    sync::{Arc, Mutex},
};

use common::{assert_occupancy_consistent, engine, path_environment, tie_free_path};
use flg::{
    DistributionSpec, Error, PlayerId, RunOutcome, Simulation, SimulationConfig,
    SimulationReport,
    export::{SummaryFormat, TraceCsvExporter, load_report, save_report},
    pipeline::{JsonlObserver, MetricsObserver},
};

/// Five unit-cost, unit-demand nodes with three candidates and two players
fn small_config() -> SimulationConfig {
    SimulationConfig {
        n_nodes: 5,
        n_potential_facilities: 3,
        n_brd_players: 2,
        max_iterations: 50,
        seed: 1,
        n_simulations: 1,
        demand_distribution: DistributionSpec::uniform(1.0, 1.0),
        cost_distribution: DistributionSpec::uniform(1.0, 1.0),
        capacitated_facilities: false,
    }
}

/// Seed 1 places both players so every other node sits next to a facility;
/// nobody can beat a utility of 1 there, so the run settles at once.
#[test]
fn test_small_run_converges_with_non_increasing_potential() {
    let mut simulation = Simulation::new(small_config()).unwrap();
    let summary = simulation.run_to_equilibrium().unwrap();

    assert_eq!(summary.run, 0);
    assert_eq!(summary.seed, 1);
    assert!(summary.iterations >= 1 && summary.iterations <= 50);
    assert_eq!(summary.trace.len(), summary.iterations);
    assert_eq!(summary.moves, summary.trace.iter().filter(|e| e.moved).count());
    assert_eq!(summary.initial_players.len(), 2);

    for (i, entry) in summary.trace.iter().enumerate() {
        assert_eq!(entry.iteration, i + 1);
        assert!(entry.player.value() < 2);
        assert_eq!(entry.players.len(), 2);
        assert_ne!(entry.players[0].facility, entry.players[1].facility);
        assert!(entry.potential >= 0.0);
    }
    assert!(summary.converged());
    assert_eq!(summary.outcome, RunOutcome::Converged);
    assert!(summary.iterations < 50);
    let potentials = summary.potential_trace();
    assert!(potentials.windows(2).all(|w| w[1] <= w[0]), "{potentials:?}");
}

/// Same configuration, same run
#[test]
fn test_runs_are_reproducible() {
    let config = SimulationConfig {
        n_nodes: 40,
        n_potential_facilities: 15,
        n_brd_players: 4,
        max_iterations: 200,
        seed: 7,
        ..SimulationConfig::default()
    };

    let first = Simulation::new(config.clone())
        .unwrap()
        .run_to_equilibrium()
        .unwrap();
    let second = Simulation::new(config)
        .unwrap()
        .run_to_equilibrium()
        .unwrap();
    assert_eq!(first, second);
}

/// Players that fill every candidate settle without moving
#[test]
fn test_full_occupancy_converges_without_moves() {
    let config = SimulationConfig {
        n_nodes: 12,
        n_potential_facilities: 3,
        n_brd_players: 3,
        max_iterations: 1000,
        seed: 3,
        ..SimulationConfig::default()
    };
    let summary = Simulation::new(config)
        .unwrap()
        .run_to_equilibrium()
        .unwrap();

    assert!(summary.converged());
    assert_eq!(summary.moves, 0);
    assert!(summary.iterations >= 3);
    for entry in &summary.trace {
        assert!(!entry.moved);
        let facilities: Vec<_> = entry.players.iter().map(|p| p.facility).collect();
        let initial: Vec<_> = summary.initial_players.iter().map(|p| p.facility).collect();
        assert_eq!(facilities, initial);
    }
}

/// On a unit path with candidates at both ends and the middle, the player in
/// the middle always leaves for the free end and the game stops there.
#[test]
fn test_unit_path_settles_at_both_ends() {
    let mut simulation = Simulation::new(SimulationConfig {
        max_iterations: 100,
        ..small_config()
    })
    .unwrap();

    for seed in 0..10 {
        let mut engine = engine(path_environment(&[1; 4], vec![0, 2, 4]), 2, seed).unwrap();
        let summary = simulation.run_engine(0, &mut engine).unwrap();

        assert!(summary.converged(), "seed {seed} did not converge");
        assert!(summary.moves <= 1);
        let mut facilities: Vec<_> = summary.final_players().iter().map(|p| p.facility).collect();
        facilities.sort_unstable();
        assert_eq!(facilities, vec![0, 4]);
        assert!(summary.potential_trace().iter().all(|&p| p == 4.0));
        assert_occupancy_consistent(&engine);
    }
}

/// Without ties, a converged run is a fixed point of best response
#[test]
fn test_converged_run_is_stable_without_ties() {
    let mut simulation = Simulation::new(SimulationConfig {
        n_nodes: 8,
        n_potential_facilities: 8,
        n_brd_players: 3,
        max_iterations: 500,
        ..SimulationConfig::default()
    })
    .unwrap();

    for seed in 0..5 {
        let mut engine = engine(tie_free_path(8), 3, seed).unwrap();
        let summary = simulation.run_engine(0, &mut engine).unwrap();
        assert!(summary.iterations <= 500);
        assert_occupancy_consistent(&engine);

        if summary.converged() {
            let settled = engine.snapshot();
            for player in 0..3 {
                assert!(!engine.best_response(PlayerId::new(player)).unwrap());
            }
            assert_eq!(engine.snapshot(), settled);
        }
    }
}

#[test]
fn test_run_many_uses_consecutive_seeds() {
    let config = SimulationConfig {
        n_nodes: 20,
        n_potential_facilities: 8,
        n_brd_players: 3,
        max_iterations: 100,
        seed: 10,
        n_simulations: 3,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config).unwrap();
    let report = simulation.run().unwrap();

    let SimulationReport::Batch(batch) = report else {
        panic!("three simulations should produce a batch report");
    };
    assert_eq!(batch.runs.len(), 3);
    for (i, run) in batch.runs.iter().enumerate() {
        assert_eq!(run.run, i);
        assert_eq!(run.seed, 10 + i as u64);
    }

    let stats = &batch.statistics;
    assert_eq!(stats.runs, 3);
    assert!(stats.converged_runs <= 3);
    assert!(stats.min_iterations as f64 <= stats.mean_iterations);
    assert!(stats.mean_iterations <= stats.max_iterations as f64);
    assert_eq!(batch.potential_traces().len(), 3);
    assert!(matches!(
        simulation.run_many(0),
        Err(Error::Configuration { .. })
    ));
}

#[test]
fn test_single_simulation_reports_single_run() {
    let report = Simulation::new(small_config()).unwrap().run().unwrap();
    assert!(matches!(report, SimulationReport::Single(_)));
}

#[test]
fn test_invalid_configurations_rejected() {
    let config = SimulationConfig {
        demand_distribution: DistributionSpec::new("poisson", 3.0, 0.0),
        ..small_config()
    };
    assert!(matches!(
        Simulation::new(config),
        Err(Error::Configuration { .. })
    ));

    let config = SimulationConfig {
        n_brd_players: 4,
        ..small_config()
    };
    assert!(matches!(
        Simulation::new(config),
        Err(Error::TooManyPlayers {
            players: 4,
            facilities: 3
        })
    ));
}

/// The JSONL observer writes one line per turn
#[test]
fn test_jsonl_observer_writes_every_turn() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("turns.jsonl");

    let mut simulation = Simulation::new(small_config())
        .unwrap()
        .with_observer(Box::new(JsonlObserver::new(&path).unwrap()));
    let summary = simulation.run_to_equilibrium().unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), summary.iterations);
    for (i, line) in lines.iter().enumerate() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["run"], 0);
        assert_eq!(value["iteration"], i + 1);
        assert_eq!(value["players"].as_array().map(Vec::len), Some(2));
    }
}

/// A shared metrics observer can be read back after the run
#[test]
fn test_shared_metrics_observer() {
    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    let mut simulation = Simulation::new(SimulationConfig {
        n_simulations: 2,
        ..small_config()
    })
    .unwrap()
    .with_observer(Box::new(Arc::clone(&metrics)));
    let batch = simulation.run_many(2).unwrap();

    let summary = metrics.lock().unwrap().summary();
    assert_eq!(summary.runs, 2);
    assert_eq!(
        summary.turns,
        batch.runs.iter().map(|r| r.iterations).sum::<usize>()
    );
    assert_eq!(
        summary.moves,
        batch.runs.iter().map(|r| r.moves).sum::<usize>()
    );
    assert_eq!(summary.moves_per_player.iter().sum::<usize>(), summary.moves);
    assert_eq!(
        summary.converged_runs,
        batch.runs.iter().filter(|r| r.converged()).count()
    );
}

/// One CSV row per player per turn
#[test]
fn test_trace_csv_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    let summary = Simulation::new(small_config())
        .unwrap()
        .run_to_equilibrium()
        .unwrap();

    TraceCsvExporter::export(&path, [&summary]).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "run",
            "iteration",
            "mover",
            "moved",
            "potential",
            "player",
            "facility",
            "utility"
        ]
    );
    assert_eq!(reader.records().count(), summary.iterations * 2);
}

#[test]
fn test_report_round_trips_through_msgpack() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.msgpack");
    let report = Simulation::new(SimulationConfig {
        n_simulations: 2,
        ..small_config()
    })
    .unwrap()
    .run()
    .unwrap();

    let format = SummaryFormat::from_path(&path);
    assert_eq!(format, SummaryFormat::MsgPack);
    save_report(&report, &path, format).unwrap();
    assert_eq!(load_report(&path, format).unwrap(), report);
}

#[test]
fn test_report_saved_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let report = Simulation::new(small_config()).unwrap().run().unwrap();

    save_report(&report, &path, SummaryFormat::Json).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["mode"], "single");

    let SimulationReport::Single(loaded) = load_report(&path, SummaryFormat::Json).unwrap() else {
        panic!("expected a single-run report");
    };
    let SimulationReport::Single(original) = report else {
        unreachable!();
    };
    assert_eq!(loaded.iterations, original.iterations);
    assert_eq!(loaded.outcome, original.outcome);
    assert_eq!(loaded.initial_players.len(), original.initial_players.len());
}
