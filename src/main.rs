use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use ucc_profiler::*;

/// Discovers unique column combinations and inclusion dependencies in delimited text files.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Files to profile; each becomes a table named after the file.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Field separator. Accepts a single ASCII character, `tab`, or `\t`.
    #[arg(short, long, default_value = ",", value_parser = parse_byte)]
    delimiter: u8,

    /// Quote character.
    #[arg(long, default_value = "\"", value_parser = parse_byte)]
    quote: u8,

    /// Treat the first line as data rather than attribute names.
    #[arg(long)]
    no_header: bool,

    /// Largest column combination to consider.
    #[arg(long)]
    max_size: Option<usize>,

    /// How to check candidates for uniqueness.
    #[arg(long, value_enum, default_value_t = StrategyArg::PartitionRefinement)]
    strategy: StrategyArg,

    /// Also report unary inclusion dependencies between the files.
    #[arg(long)]
    inds: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    PartitionRefinement,
    RowHashing,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::PartitionRefinement => Strategy::PartitionRefinement,
            StrategyArg::RowHashing => Strategy::RowHashing,
        }
    }
}

fn parse_byte(s: &str) -> std::result::Result<u8, String> {
    match s {
        "tab" | "\\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("expected a single ASCII character, got `{}`", s)),
        },
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let options = LoadOptions {
        delimiter: args.delimiter,
        quote: args.quote,
        has_header: !args.no_header,
    };
    let profiler = UccProfiler::new(ProfilerConfig {
        max_combination_size: args.max_size,
        strategy: args.strategy.into(),
    });

    let tables = args
        .files
        .iter()
        .map(|path| load_path(path, &options))
        .collect::<Result<Vec<_>>>()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for table in tables.iter() {
        for ucc in profiler.profile(table)? {
            writeln!(out, "{}", ucc)?;
        }
    }

    if args.inds {
        let tables: Vec<&Table> = tables.iter().collect();
        for ind in discover_unary_inds(&tables)? {
            writeln!(out, "{}", ind)?;
        }
    }

    Ok(())
}
