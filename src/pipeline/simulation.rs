//! Simulation driver: runs best-response dynamics to a Nash equilibrium

use std::{fmt, path::Path, sync::Arc};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    analysis::BatchStatistics,
    distance::DistanceMatrix,
    dynamics::{BrdEngine, TraceEntry},
    environment::{Distribution, DistributionSpec, EnvironmentConfig, GraphEnvironment},
    ports::Observer,
    types::{PlayerId, PlayerState},
};

/// Mixed into the run seed for the turn-order stream so it never replays the
/// engine's placement and tie-break draws.
const TURN_ORDER_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of nodes in the graph
    pub n_nodes: usize,

    /// Number of nodes allowed to host a facility
    pub n_potential_facilities: usize,

    /// Number of players taking part in the dynamics
    pub n_brd_players: usize,

    /// Turns before a run is stopped without converging
    pub max_iterations: usize,

    /// Base seed; run `i` uses `seed + i`
    pub seed: u64,

    /// Number of independent runs
    pub n_simulations: usize,

    /// Node demand distribution
    pub demand_distribution: DistributionSpec,

    /// Edge cost distribution
    #[serde(alias = "weight_distribution")]
    pub cost_distribution: DistributionSpec,

    /// Reserved for capacitated facilities; not used by the dynamics
    pub capacitated_facilities: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_nodes: 100,
            n_potential_facilities: 80,
            n_brd_players: 10,
            max_iterations: 1000,
            seed: 66,
            n_simulations: 1,
            demand_distribution: DistributionSpec::normal(20.0, 5.0),
            cost_distribution: DistributionSpec::normal(5.0, 1.0),
            capacitated_facilities: false,
        }
    }
}

impl SimulationConfig {
    /// Check every field before any simulation state is created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for out-of-range counts or bad
    /// distributions and [`Error::TooManyPlayers`] if players outnumber candidates.
    pub fn validate(&self) -> Result<()> {
        if self.n_nodes == 0 {
            return Err(Error::configuration("n_nodes must be positive"));
        }
        if self.n_potential_facilities == 0 || self.n_potential_facilities > self.n_nodes {
            return Err(Error::configuration(format!(
                "n_potential_facilities must be in [1, {}], got {}",
                self.n_nodes, self.n_potential_facilities
            )));
        }
        if self.n_brd_players == 0 {
            return Err(Error::configuration("n_brd_players must be positive"));
        }
        if self.n_brd_players > self.n_potential_facilities {
            return Err(Error::TooManyPlayers {
                players: self.n_brd_players,
                facilities: self.n_potential_facilities,
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::configuration("max_iterations must be positive"));
        }
        if self.n_simulations == 0 {
            return Err(Error::configuration("n_simulations must be positive"));
        }
        Distribution::try_from(&self.demand_distribution)?.sampler()?;
        Distribution::try_from(&self.cost_distribution)?.sampler()?;
        Ok(())
    }

    /// Seed used by run `run`.
    pub fn run_seed(&self, run: usize) -> u64 {
        self.seed.wrapping_add(run as u64)
    }

    /// Seed of the turn-order stream of run `run`.
    pub fn turn_order_seed(&self, run: usize) -> u64 {
        self.run_seed(run) ^ TURN_ORDER_STREAM
    }

    pub fn environment_config(&self, seed: u64) -> EnvironmentConfig {
        EnvironmentConfig {
            n_nodes: self.n_nodes,
            n_potential_facilities: self.n_potential_facilities,
            seed,
            demand_distribution: self.demand_distribution.clone(),
            cost_distribution: self.cost_distribution.clone(),
        }
    }

    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open configuration {}", path.display()),
            source,
        })?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config)
    }

    /// Load a configuration, falling back to the defaults if the file is missing
    /// or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("using default configuration, {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Save the configuration as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// No player has a strictly improving move: a Nash equilibrium
    Converged,
    /// The iteration cap was hit first
    IterationLimitReached,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Converged => write!(f, "converged"),
            RunOutcome::IterationLimitReached => write!(f, "iteration limit reached"),
        }
    }
}

/// Result of a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run index within the batch
    pub run: usize,
    /// Seed used for the environment, engine and turn order
    pub seed: u64,
    /// Number of best-response turns played
    pub iterations: usize,
    pub outcome: RunOutcome,
    /// Turns in which the player switched facility
    pub moves: usize,
    /// Players right after initialization
    pub initial_players: Vec<PlayerState>,
    /// One entry per turn
    pub trace: Vec<TraceEntry>,
}

impl RunSummary {
    pub fn converged(&self) -> bool {
        self.outcome == RunOutcome::Converged
    }

    pub fn final_potential(&self) -> Option<f64> {
        self.trace.last().map(|entry| entry.potential)
    }

    pub fn final_players(&self) -> &[PlayerState] {
        self.trace
            .last()
            .map_or(self.initial_players.as_slice(), |entry| entry.players.as_slice())
    }

    /// Potential after every turn.
    pub fn potential_trace(&self) -> Vec<f64> {
        self.trace.iter().map(|entry| entry.potential).collect()
    }

    /// Player snapshot after every turn.
    pub fn player_trace(&self) -> Vec<Vec<PlayerState>> {
        self.trace.iter().map(|entry| entry.players.clone()).collect()
    }
}

/// Result of several independent runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: Vec<RunSummary>,
    pub statistics: BatchStatistics,
}

impl BatchSummary {
    pub fn new(runs: Vec<RunSummary>) -> Self {
        let statistics = BatchStatistics::from_runs(&runs);
        Self { runs, statistics }
    }

    pub fn mean_iterations(&self) -> f64 {
        self.statistics.mean_iterations
    }

    pub fn mean_final_potential(&self) -> f64 {
        self.statistics.mean_final_potential
    }

    pub fn convergence_rate(&self) -> f64 {
        self.statistics.convergence_rate()
    }

    pub fn potential_traces(&self) -> Vec<Vec<f64>> {
        self.runs.iter().map(RunSummary::potential_trace).collect()
    }

    pub fn player_traces(&self) -> Vec<Vec<Vec<PlayerState>>> {
        self.runs.iter().map(RunSummary::player_trace).collect()
    }
}

/// Outcome of [`Simulation::run`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SimulationReport {
    Single(RunSummary),
    Batch(BatchSummary),
}

/// Drives best-response dynamics for one or more runs
pub struct Simulation {
    config: SimulationConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl Simulation {
    /// Create a new simulation from a validated configuration
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        if config.capacitated_facilities {
            log::warn!("capacitated facilities are not supported yet; ignoring the flag");
        }
        Ok(Self {
            config,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the simulation
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Build the environment, distances and engine of run `run`.
    pub fn build_engine(&self, run: usize) -> Result<BrdEngine> {
        let seed = self.config.run_seed(run);
        let environment = GraphEnvironment::generate(&self.config.environment_config(seed))?;
        let distances = DistanceMatrix::compute(&environment);
        BrdEngine::new(
            Arc::new(environment),
            Arc::new(distances),
            self.config.n_brd_players,
            seed,
        )
    }

    /// Run the configured number of simulations.
    pub fn run(&mut self) -> Result<SimulationReport> {
        if self.config.n_simulations == 1 {
            self.run_to_equilibrium().map(SimulationReport::Single)
        } else {
            self.run_many(self.config.n_simulations)
                .map(SimulationReport::Batch)
        }
    }

    /// Run a single simulation (run 0) until equilibrium or the iteration cap.
    pub fn run_to_equilibrium(&mut self) -> Result<RunSummary> {
        self.notify_start(1)?;
        let mut engine = self.build_engine(0)?;
        let summary = self.run_engine(0, &mut engine)?;
        self.notify_end()?;
        Ok(summary)
    }

    /// Run `n_simulations` independent simulations.
    pub fn run_many(&mut self, n_simulations: usize) -> Result<BatchSummary> {
        if n_simulations == 0 {
            return Err(Error::configuration("n_simulations must be positive"));
        }
        self.notify_start(n_simulations)?;
        let mut runs = Vec::with_capacity(n_simulations);
        for run in 0..n_simulations {
            let mut engine = self.build_engine(run)?;
            runs.push(self.run_engine(run, &mut engine)?);
        }
        self.notify_end()?;

        let batch = BatchSummary::new(runs);
        log::info!(
            "{} runs: mean iterations {:.2}, mean final potential {:.2}, {:.0}% converged",
            n_simulations,
            batch.mean_iterations(),
            batch.mean_final_potential(),
            batch.convergence_rate() * 100.0
        );
        Ok(batch)
    }

    /// Drive `engine` until no player can improve or `max_iterations` turns pass.
    ///
    /// Turn order comes from its own stream, seeded apart from the engine. A player
    /// that finds no improving move is marked settled; any move unsettles everyone.
    pub fn run_engine(&mut self, run: usize, engine: &mut BrdEngine) -> Result<RunSummary> {
        let seed = self.config.run_seed(run);
        let max_iterations = self.config.max_iterations;
        let n_players = engine.n_players();
        let mut turn_order = StdRng::seed_from_u64(self.config.turn_order_seed(run));

        log::info!(
            "run {run} (seed {seed}): {} nodes, {} candidates, {n_players} players",
            engine.environment().n_nodes(),
            engine.environment().n_candidates()
        );
        for observer in &mut self.observers {
            observer.on_run_start(run, engine)?;
        }

        let initial_players = engine.snapshot();
        let mut unsettled = vec![true; n_players];
        let mut trace = Vec::new();
        let mut iterations = 0;
        let mut moves = 0;

        while unsettled.iter().any(|&pending| pending) && iterations < max_iterations {
            let player = PlayerId::new(turn_order.random_range(0..n_players));
            let moved = engine.best_response(player)?;
            if moved {
                moves += 1;
                unsettled.fill(true);
            } else {
                unsettled[player.value()] = false;
            }

            iterations += 1;
            let entry = TraceEntry {
                iteration: iterations,
                player,
                moved,
                potential: engine.potential(),
                players: engine.snapshot(),
            };
            for observer in &mut self.observers {
                observer.on_turn(run, &entry)?;
            }
            trace.push(entry);
        }

        let outcome = if unsettled.iter().any(|&pending| pending) {
            RunOutcome::IterationLimitReached
        } else {
            RunOutcome::Converged
        };

        let summary = RunSummary {
            run,
            seed,
            iterations,
            outcome,
            moves,
            initial_players,
            trace,
        };
        log::info!(
            "run {run} {outcome} after {iterations} iterations ({moves} moves), final potential {:.2}",
            summary.final_potential().unwrap_or(f64::NAN)
        );
        for observer in &mut self.observers {
            observer.on_run_end(run, &summary)?;
        }
        Ok(summary)
    }

    fn notify_start(&mut self, total_runs: usize) -> Result<()> {
        let max_iterations = self.config.max_iterations;
        for observer in &mut self.observers {
            observer.on_simulations_start(total_runs, max_iterations)?;
        }
        Ok(())
    }

    fn notify_end(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_simulations_end()?;
        }
        Ok(())
    }
}
