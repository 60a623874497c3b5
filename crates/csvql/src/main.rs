use clap::Parser;
use csvql::logging::LogConfig;
use csvql::{repl, Database};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Interactive SQL shell over a directory of CSV tables
#[derive(Parser, Debug)]
#[command(name = "csvql", version, about)]
struct Cli {
    /// Directory holding `<table>.csv` files
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also write logs to this file, rotated daily
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::default().with_level(&cli.log_level);
    if let Some(path) = &cli.log_file {
        log_config = log_config.with_file(path);
    }
    let _guard = match log_config.init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let db = match Database::open(&cli.data_dir) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let result = repl::run(&db, stdin.lock(), &mut io::stdout(), &mut io::stderr());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
