mod ontology;
mod repl;
mod table;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dlrete_engine::{Config, Engine};
use tracing_subscriber::EnvFilter;

/// Incremental RETE reasoner for OWL 2 RL + SWRL: load an ontology,
/// query it, save/restore its state.
#[derive(Parser, Debug)]
#[command(name = "dlrete", version)]
struct Args {
    /// Ontology text file to load before anything else runs.
    input: Option<PathBuf>,

    /// Write a snapshot after loading/querying.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load a snapshot instead of starting from an empty network.
    #[arg(long)]
    load: Option<PathBuf>,

    /// Run one graph-pattern query and exit instead of entering the REPL.
    #[arg(long)]
    query: Option<String>,

    /// Print node-sharing / propagation metrics before exiting.
    #[arg(long)]
    stats: bool,

    /// Exit non-zero if the store contains an uncaught inconsistency.
    #[arg(long)]
    strict: bool,

    /// Query deadline in milliseconds; 0 means no deadline.
    #[arg(long, default_value_t = 0)]
    timeout_ms: u64,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("RETE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let config = Config {
        strict: args.strict,
        ..Config::default()
    };

    let mut engine = match &args.load {
        Some(path) => match Engine::load(path, config) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("error loading snapshot: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => match Engine::new(config) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("error constructing engine: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    engine.set_progress_callback(|processed, total, message| {
        eprintln!("[{processed}/{total}] {message}");
    });

    if let Some(input) = &args.input {
        let text = match std::fs::read_to_string(input) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("error reading {}: {e}", input.display());
                return ExitCode::FAILURE;
            }
        };
        let (records, errors) = ontology::load_facts(engine.symbols(), &text);
        for (line, message) in &errors {
            eprintln!("[!] {}:{line}: {message}", input.display());
        }
        if let Err(e) = engine.add_facts_batch(records) {
            eprintln!("error loading facts: {e}");
            return ExitCode::FAILURE;
        }
    }

    if let Some(query_text) = &args.query {
        match engine.query(query_text, args.timeout_ms) {
            Ok(result) => table::print_result(engine.symbols(), &result),
            Err(e) => {
                eprintln!("query error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if args.stats {
        engine.print_metrics();
        println!("{:#?}", engine.get_metrics());
    }

    if let Some(path) = &args.save {
        if let Err(e) = engine.save(path) {
            eprintln!("error saving snapshot: {e}");
            return ExitCode::FAILURE;
        }
    }

    if args.query.is_none() {
        repl::run(&mut engine);
    }

    if engine.has_strict_violation() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
