use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
    str::FromStr,
};

use clap::{ArgAction, Parser};
use rand::{rngs::StdRng, SeedableRng};
use random_line::{parse_count, Algorithm, RandomLine};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "random-line")]
#[command(about = "Print random lines of a file without reading all of it")]
struct Args {
    file: PathBuf,

    /// Amount of lines to print. Lines are drawn with replacement
    #[arg(short = 'n', long, default_value = "1", value_parser = parse_count, allow_hyphen_values = true)]
    count: usize,

    /// `fast` (biased towards lines following long lines) or `uniform` (indexes the file first)
    #[arg(short, long, default_value = "fast", value_parser = Algorithm::from_str)]
    algorithm: Algorithm,

    /// Seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("random-line: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> random_line::Result<()> {
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut sampler = RandomLine::open_with_rng(&args.file, args.algorithm, rng)?;
    info!(
        file = %args.file.display(),
        algorithm = %sampler.algorithm(),
        bytes = sampler.size(),
        "sampling"
    );

    let lines = sampler.next_n(args.count)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in lines {
        out.write_all(&line)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    Ok(())
}
