mod logic;
mod util;

use anyhow::{Context, Result};
use castline_game::CatalogSource;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{
    JsonFileSource, JsonLinesLedger, LiveOptions, RunReport, SeedInfo, SimulationOptions,
    resolve_seed_inputs, run_live, run_simulation,
};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Independent casts with random phases and hands (fast)
    Simulate,
    /// A roster of anglers casting into the tick loop on a timer
    Loop,
}

#[derive(Debug, Parser)]
#[command(name = "castline-tester", version = "0.1.0")]
#[command(about = "Catch-distribution harness for the Castline fishing engine")]
struct Args {
    /// Harness to run: simulate (independent casts) or loop (live ticks)
    #[arg(long, value_enum, default_value_t = RunMode::Simulate)]
    mode: RunMode,

    /// Seeds to run (comma-separated; decimal, 0x-hex or `random`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Casts per seed (simulate mode only)
    #[arg(long, default_value_t = 1000)]
    casts: u64,

    /// Ticks per seed (loop mode only)
    #[arg(long, default_value_t = 48)]
    ticks: u64,

    /// Anglers on the roster (loop mode only)
    #[arg(long, default_value_t = 8)]
    players: usize,

    /// Fish instances sampled into each pool
    #[arg(long, default_value_t = castline_game::constants::DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,

    /// Milliseconds between ticks (loop mode only)
    #[arg(long, default_value_t = 1)]
    interval_ms: u64,

    /// Fish catalog JSON; the bundled catalog when omitted
    #[arg(long)]
    fish: Option<PathBuf>,

    /// Card catalog JSON; the bundled catalog when omitted
    #[arg(long)]
    cards: Option<PathBuf>,

    /// Directory for JSON-lines catch ledgers (loop mode only)
    #[arg(long)]
    ledger_dir: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    announce_banner();

    let start_time = Instant::now();
    let seed_tokens = split_csv(&args.seeds);
    let seed_infos = resolve_seed_inputs(&seed_tokens)?;
    let source = JsonFileSource::new(args.fish.clone(), args.cards.clone());

    let reports = match args.mode {
        RunMode::Simulate => run_simulations(&args, &source, &seed_infos)?,
        RunMode::Loop => run_loops(&args, &source, &seed_infos).await?,
    };

    write_reports(&args, &reports, start_time)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn announce_banner() {
    println!("{}", "🎣 Castline Catch Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn run_simulations(
    args: &Args,
    source: &JsonFileSource,
    seeds: &[SeedInfo],
) -> Result<Vec<RunReport>> {
    println!("{}", "🧪 Simulating independent casts".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let fish = source
        .load_fish_catalog()
        .context("reading fish catalog")?;
    let cards = source
        .load_card_catalog()
        .context("reading card catalog")?;
    let options = SimulationOptions {
        casts: args.casts,
        sample_size: args.sample_size,
    };

    let mut reports = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let run_start = Instant::now();
        let report = run_simulation(&fish, &cards, seed, options);
        println!(
            "✅ seed {} - {} casts, {} catches - {:?}",
            seed.seed,
            report.casts,
            report.catches,
            run_start.elapsed()
        );
        reports.push(report);
    }
    Ok(reports)
}

fn ledger_for(args: &Args, seed: &SeedInfo, seeds: usize) -> Result<JsonLinesLedger> {
    let Some(base) = &args.ledger_dir else {
        return Ok(JsonLinesLedger::in_memory());
    };
    let dir = if seeds > 1 {
        base.join(format!("seed-{}", seed.seed))
    } else {
        base.clone()
    };
    JsonLinesLedger::open(&dir).with_context(|| format!("failed to open ledger in {}", dir.display()))
}

async fn run_loops(
    args: &Args,
    source: &JsonFileSource,
    seeds: &[SeedInfo],
) -> Result<Vec<RunReport>> {
    println!("{}", "⏱️  Running the live loop".bright_blue().bold());
    println!("{}", "-".repeat(30).blue());

    let options = LiveOptions {
        ticks: args.ticks,
        players: args.players,
        sample_size: args.sample_size,
        interval_ms: args.interval_ms,
    };

    let mut reports = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let run_start = Instant::now();
        let ledger = ledger_for(args, seed, seeds.len())?;
        match run_live(source.clone(), ledger, seed, options).await {
            Ok(report) => {
                println!(
                    "✅ seed {} - {} ticks, {} catches - {:?}",
                    seed.seed,
                    options.ticks,
                    report.catches,
                    run_start.elapsed()
                );
                reports.push(report);
            }
            Err(err) => {
                eprintln!("❌ seed {} - {err:#}", seed.seed.to_string().red());
                return Err(err);
            }
        }
    }
    Ok(reports)
}

fn write_reports(args: &Args, reports: &[RunReport], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, reports)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, reports)?,
        "csv" => logic::reports::generate_csv_report(&mut output_target, reports)?,
        _ => {
            let duration = start_time.elapsed();
            logic::reports::generate_console_report(&mut output_target, reports, duration)?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
