//! Adaptive evolution experiment runner.
//!
//! Runs the learned strategy selector on each selected objective, then the
//! fixed-strategy benchmark, and prints the summaries.
//!
//! Usage:
//!     cargo run --bin adaptive-ea --release -- --function all --runs 5 --seed 42

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use math_adaptive_evolution::{
    ConvergenceMetric, ExperimentConfig, ExperimentResult, ObjectiveFn, RunIsolation, Strategy,
    StrategyMetrics, report, run_adaptive_experiment, run_strategy_benchmark, seeded_rng,
};
use math_test_functions::{function_by_name, function_names, get_function_metadata};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "adaptive-ea",
    about = "Differential evolution with a learned strategy selector",
    long_about = "Differential evolution with a learned strategy selector, \
                  compared against fixed strategies"
)]
struct Cli {
    /// JSON experiment configuration (missing fields use the defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Objective to optimize (default: sphere and sinusoidal)
    #[arg(long, value_enum)]
    function: Option<FunctionChoice>,

    /// Generations per adaptive run, iteration budget of benchmark runs
    #[arg(long)]
    generations: Option<usize>,

    /// Independent runs per experiment and per benchmarked strategy
    #[arg(long)]
    runs: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Whether the selector and archive carry over between runs
    #[arg(long, value_enum)]
    isolation: Option<IsolationChoice>,

    /// Convergence speed measure of the benchmark
    #[arg(long, value_enum)]
    convergence_metric: Option<MetricChoice>,

    /// Comma separated strategy names, in action order (e.g. best1bin,rand1exp)
    #[arg(long, value_delimiter = ',')]
    strategies: Option<Vec<Strategy>>,

    /// Skip the fixed-strategy benchmark
    #[arg(long)]
    skip_benchmark: bool,

    /// Skip the adaptive experiment
    #[arg(long)]
    skip_adaptive: bool,

    /// Write every result as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// List available objectives and exit
    #[arg(long)]
    list_functions: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FunctionChoice {
    Sphere,
    Sinusoidal,
    Rastrigin,
    All,
}

impl FunctionChoice {
    fn names(self) -> Vec<String> {
        match self {
            FunctionChoice::Sphere => vec!["sphere".into()],
            FunctionChoice::Sinusoidal => vec!["sinusoidal".into()],
            FunctionChoice::Rastrigin => vec!["rastrigin".into()],
            FunctionChoice::All => function_names(),
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum IsolationChoice {
    Shared,
    PerRun,
}

impl From<IsolationChoice> for RunIsolation {
    fn from(choice: IsolationChoice) -> Self {
        match choice {
            IsolationChoice::Shared => RunIsolation::Shared,
            IsolationChoice::PerRun => RunIsolation::PerRun,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum MetricChoice {
    SolutionIndexProxy,
    GenerationTrace,
}

impl From<MetricChoice> for ConvergenceMetric {
    fn from(choice: MetricChoice) -> Self {
        match choice {
            MetricChoice::SolutionIndexProxy => ConvergenceMetric::SolutionIndexProxy,
            MetricChoice::GenerationTrace => ConvergenceMetric::GenerationTrace,
        }
    }
}

#[derive(Serialize)]
struct FunctionReport {
    function: String,
    experiment: Option<ExperimentResult>,
    benchmark: Option<Vec<StrategyMetrics>>,
}

#[derive(Serialize)]
struct Output<'a> {
    config: &'a ExperimentConfig,
    results: Vec<FunctionReport>,
}

fn build_config(args: &Cli) -> anyhow::Result<ExperimentConfig> {
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    if let Some(g) = args.generations {
        config.max_generations = g;
    }
    if let Some(r) = args.runs {
        config.num_runs = r;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(i) = args.isolation {
        config.isolation = i.into();
    }
    if let Some(m) = args.convergence_metric {
        config.convergence_metric = m.into();
    }
    if let Some(s) = &args.strategies {
        config.strategies = s.clone();
    }
    config.validate()?;
    Ok(config)
}

fn list_functions() {
    let metadata = get_function_metadata();
    for name in function_names() {
        if let Some(meta) = metadata.get(&name) {
            println!(
                "{:<12} {} (bounds {:?}, multimodal: {})",
                name, meta.description, meta.bounds, meta.multimodal
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.list_functions {
        list_functions();
        return Ok(());
    }

    let config = build_config(&args)?;
    let names = match args.function {
        Some(choice) => choice.names(),
        None => vec!["sphere".into(), "sinusoidal".into()],
    };
    let mut rng = seeded_rng(config.seed);
    log::info!(
        "{} strategies, {} runs x {} generations, isolation {:?}",
        config.strategies.len(),
        config.num_runs,
        config.max_generations,
        config.isolation
    );

    let mut results = Vec::with_capacity(names.len());
    for name in names {
        let meta = function_by_name(&name)
            .with_context(|| format!("unknown objective '{name}'"))?;
        let objective: ObjectiveFn = Arc::new(meta.function);

        let experiment = if args.skip_adaptive {
            None
        } else {
            let result = run_adaptive_experiment(&config, &objective, &mut rng)?;
            println!("\n{}", report::experiment_summary(&format!("{name} (adaptive)"), &result));
            Some(result)
        };

        let benchmark = if args.skip_benchmark {
            None
        } else {
            let ranked = run_strategy_benchmark(&config, &objective, &mut rng)?;
            println!("\nEvaluating {name} function:\n{}", report::ranking_table(&ranked));
            Some(ranked)
        };

        results.push(FunctionReport {
            function: name,
            experiment,
            benchmark,
        });
    }

    if let Some(path) = &args.output {
        let output = Output {
            config: &config,
            results,
        };
        let json = serde_json::to_string_pretty(&output)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("results written to {}", path.display());
    }
    Ok(())
}
