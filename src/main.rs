//! # wheelsieve CLI
//!
//! Thin front-end over the library: count, print and nth-prime operations
//! with a `--kind` switch for the prime k-tuplet categories. Counting and
//! nth-prime use the parallel partitioner (`--threads 0` = all cores);
//! printing is single-threaded because its output is ordered.

use std::io::{BufWriter, Write};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use wheelsieve::{Config, Kind};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "wheelsieve", version, about = "Fast prime number and prime k-tuplet sieve")]
struct Cli {
    /// Number of worker threads (0 = all logical cores)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Segment buffer size in KiB (power of two, 1..=1024)
    #[arg(long, default_value_t = 32)]
    sieve_size: usize,

    /// Largest pre-sieved prime (7..=19)
    #[arg(long, default_value_t = 13)]
    pre_sieve: u64,

    /// Report elapsed wall time on stderr when done
    #[arg(long)]
    time: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count primes or prime k-tuplets in [start, stop]
    Count {
        /// Category to count
        #[arg(long, value_enum, default_value_t = KindArg::Primes)]
        kind: KindArg,
        start: u64,
        stop: u64,
    },
    /// Print primes or prime k-tuplets in [start, stop], ascending
    Print {
        /// Category to print
        #[arg(long, value_enum, default_value_t = KindArg::Primes)]
        kind: KindArg,
        start: u64,
        stop: u64,
    },
    /// Find the nth prime greater than start
    Nth {
        n: u64,
        /// Offset to start the search from
        #[arg(long, default_value_t = 0)]
        start: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Primes,
    Twins,
    Triplets,
    Quadruplets,
    Quintuplets,
    Sextuplets,
    Septuplets,
}

impl From<KindArg> for Kind {
    fn from(kind: KindArg) -> Kind {
        match kind {
            KindArg::Primes => Kind::Primes,
            KindArg::Twins => Kind::Twins,
            KindArg::Triplets => Kind::Triplets,
            KindArg::Quadruplets => Kind::Quadruplets,
            KindArg::Quintuplets => Kind::Quintuplets,
            KindArg::Sextuplets => Kind::Sextuplets,
            KindArg::Septuplets => Kind::Septuplets,
        }
    }
}

fn main() -> Result<()> {
    // Structured logging: LOG_FORMAT=json for machines, stderr otherwise.
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let config = Config {
        sieve_size: cli.sieve_size * 1024,
        pre_sieve_limit: cli.pre_sieve,
    };
    let started = Instant::now();

    match cli.command {
        Commands::Count { kind, start, stop } => {
            let count = wheelsieve::parallel_count_with_config(
                kind.into(),
                start,
                stop,
                cli.threads,
                &config,
            )?;
            println!("{}", count);
        }
        Commands::Print { kind, start, stop } => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            wheelsieve::print_with_config(kind.into(), start, stop, &mut out, &config)?;
            out.flush()?;
        }
        Commands::Nth { n, start } => {
            let prime =
                wheelsieve::parallel_nth_prime_with_config(n, start, cli.threads, &config)?;
            println!("{}", prime);
        }
    }

    if cli.time {
        eprintln!("elapsed: {:.3}s", started.elapsed().as_secs_f64());
    }
    Ok(())
}
