//! Headless runner: loads a content pack, auto-plays a session, prints a
//! summary and optionally verifies determinism.

use std::path::PathBuf;

use clap::Parser;
use idlemind_data::{GameData, default_game_data, load_game_data};
use idlemind_headless::autoplay::{self, RunSummary};

#[derive(Parser, Debug)]
#[command(name = "idlemind-headless")]
#[command(about = "Auto-play an Idlemind session without a frontend")]
struct Args {
    /// Content directory (jobs, interludes, chapters, config). Uses the
    /// built-in pack when omitted.
    #[arg(long)]
    content: Option<PathBuf>,

    /// Seconds of game time to simulate
    #[arg(long, default_value_t = 3600)]
    seconds: u32,

    /// Random seed; overrides the content config
    #[arg(long)]
    seed: Option<u64>,

    /// Play a second time and compare the final states
    #[arg(long, default_value_t = false)]
    check_determinism: bool,
}

fn load(args: &Args) -> Result<GameData, idlemind_data::DataLoadError> {
    let mut data = match &args.content {
        Some(dir) => load_game_data(dir)?,
        None => default_game_data()?,
    };
    if let Some(seed) = args.seed {
        data.config.seed = seed;
    }
    Ok(data)
}

fn print_summary(summary: &RunSummary) {
    println!("=== Idlemind headless run ===");
    println!("Seconds:     {}", summary.seconds);
    println!("Chapter:     {}", summary.chapter);
    println!("Completions: {}", summary.completions);
    println!("Money:       {}", summary.money);
    println!("AGI sum:     {}", summary.agi_sum);
    println!("Wonder:      {}", summary.wonder);
    println!("Stories:     {}", summary.stories_read);
    let unlocked: Vec<String> = summary.unlocked.iter().map(|id| id.to_string()).collect();
    println!("Unlocked:    {}", unlocked.join(", "));
    match &summary.ending {
        Some(ending) => println!("Ending:      {ending}"),
        None => println!("Ending:      (still running)"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let data = load(&args)?;

    let mut first = data.clone().new_session();
    let summary = autoplay::play(&mut first, args.seconds);
    print_summary(&summary);

    if args.check_determinism {
        let mut second = data.new_session();
        let again = autoplay::play(&mut second, args.seconds);
        if again == summary && first.state() == second.state() {
            println!("Determinism: PASS (states match)");
        } else {
            println!("Determinism: FAIL! runs diverged");
            std::process::exit(1);
        }
    }

    Ok(())
}
