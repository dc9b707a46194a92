use std::{env, io, process};

use planbench::{
    BenchConfig, BenchError, Benchmarks, OptimizerProfiles, Reporter, SqliteBackend,
    cli::CommandLineConfig, config::resolve_config_path, logging::init_logging,
};
use tracing::info;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let cli = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(2);
        }
    };

    let backend = match open_backend(&config) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("{err}");
            process::exit(2);
        }
    };

    if !cli.color {
        colored::control::set_override(false);
    }
    let reporter = Reporter::new(cli.format, cli.color);
    let bench = Benchmarks::new(backend, config.trials, config.queries, config.retry);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match bench.start(&reporter, &mut out) {
        Ok(summary) if summary.success() => {
            info!(queries = summary.completed, "benchmark finished");
        }
        Ok(summary) => {
            eprintln!("failed queries: {}", summary.failed.join(", "));
            process::exit(1);
        }
        Err(err) => {
            eprintln!("failed to write report: {err}");
            process::exit(1);
        }
    }
}

fn load_config(cli: &CommandLineConfig) -> Result<BenchConfig, BenchError> {
    let path = resolve_config_path(cli.config.as_deref());
    let mut config = BenchConfig::load(&path)?;
    if let Some(database) = &cli.database {
        config.database = database.clone();
    }
    if let Some(trials) = cli.trials {
        config.trials = trials;
    }
    if let Some(max_failures) = cli.max_failures {
        config.retry.max_failures = Some(max_failures);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.trial_timeout_ms = Some(timeout_ms);
    }
    Ok(config)
}

fn open_backend(config: &BenchConfig) -> Result<SqliteBackend, BenchError> {
    let backend = SqliteBackend::open_database(&config.database)?
        .with_optimizers(OptimizerProfiles::default().merged(&config.optimizers))
        .with_trial_timeout(config.trial_timeout());
    backend.run_setup(&config.setup)?;
    for query in &config.queries {
        if let Some(missing) = query
            .optimizers
            .iter()
            .find(|v| backend.optimizers().get(v.as_str()).is_none())
        {
            return Err(BenchError::unknown_optimizer(format!(
                "{missing} (query {})",
                query.name
            )));
        }
    }
    Ok(backend)
}
