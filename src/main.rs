//! CLI entry point for the arena battle simulator

use arena_sim::{
    config::{BattleConfig, SimulatorSettings},
    roster,
    simulation::{run_battle, run_series},
    CombatStats, CombatantRecord,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "arena-sim")]
#[command(version)]
#[command(about = "Turn-based arena battle simulator", long_about = None)]
struct Args {
    /// Path to the battle file (YAML or JSON); built-in roster otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of battles to run
    #[arg(short, long, default_value = "1")]
    num_sims: usize,

    /// Seed for the first battle; battle i uses seed + i
    #[arg(short, long)]
    seed: Option<u64>,

    /// Use parallel processing
    #[arg(short, long, default_value = "false")]
    parallel: bool,

    /// Worker threads for parallel runs (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Print the turn-by-turn log of a single battle
    #[arg(long, default_value = "false")]
    narrate: bool,

    /// Debug: print resolved combatant stats and exit
    #[arg(long, default_value = "false")]
    debug_stats: bool,

    /// Show timing information
    #[arg(short, long, default_value = "false")]
    timing: bool,
}

fn load_battle(args: &Args) -> Result<BattleConfig, String> {
    match &args.config {
        Some(path) => BattleConfig::from_file(path)
            .map_err(|e| format!("Error loading battle file {}: {}", path.display(), e)),
        None => Ok(BattleConfig {
            player: roster::starter_record("Challenger"),
            opponent: CombatantRecord::new(roster::arena_rival()),
            settings: SimulatorSettings::default(),
        }),
    }
}

fn print_stats(side: &str, stats: &CombatStats) {
    println!("{} {}", side, stats.display_name());
    println!("  HP:              {}", stats.hp);
    println!("  Attack:          {}", stats.attack);
    println!("  Defense:         {}", stats.defense);
    println!("  Speed:           {}", stats.speed);
    println!("  Critical Chance: {:.2}%", stats.critical_chance * 100.0);
    println!("  Critical Damage: {:.2}x", stats.critical_damage);
    println!("  Dodge Chance:    {:.2}%", stats.dodge_chance * 100.0);
    println!("  Accuracy:        {:.2}%", stats.accuracy * 100.0);
    println!("  Record:          {}W / {}L", stats.wins, stats.losses);
}

fn run(args: Args) -> Result<(), String> {
    let config = load_battle(&args)?;
    let player = config.player.resolve();
    let opponent = config.opponent.resolve();

    if args.debug_stats {
        println!("============================================================");
        println!("RESOLVED COMBATANT STATS");
        println!("============================================================");
        print_stats("PLAYER:  ", &player);
        println!();
        print_stats("OPPONENT:", &opponent);
        return Ok(());
    }

    let seed = args.seed.unwrap_or_else(rand::random::<u64>);
    let start = Instant::now();

    if args.num_sims <= 1 {
        let outcome =
            run_battle(&player, &opponent, config.settings, seed).map_err(|e| e.to_string())?;
        let elapsed = start.elapsed();
        let standings = outcome.standings();

        match args.output {
            OutputFormat::Text => {
                if args.narrate {
                    for line in &outcome.log {
                        println!("{}", line);
                    }
                    println!();
                }
                println!("=== Battle Result ===");
                println!("Seed: {}", seed);
                println!("Winner: {} ({})", outcome.winner.display_name(), outcome.winner_side);
                println!("Decision: {:?}", outcome.decision);
                println!();
                println!(
                    "Turns: {} ({} rounds)",
                    outcome.summary.total_turns,
                    outcome.summary.rounds()
                );
                println!("Total Damage: {}", outcome.summary.total_damage);
                println!("Critical Hits: {}", outcome.summary.critical_hits);
                println!("Dodges: {}", outcome.summary.dodges);
                println!();
                println!(
                    "Standings: {} {}W/{}L, {} {}W/{}L",
                    standings.winner_name,
                    standings.winner_wins,
                    standings.winner_losses,
                    standings.loser_name,
                    standings.loser_wins,
                    standings.loser_losses
                );
                if args.timing {
                    println!();
                    println!("--- Performance ---");
                    println!("Total time: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
                }
            }
            OutputFormat::Json => {
                let log = if args.narrate { outcome.log.clone() } else { Vec::new() };
                let output = serde_json::json!({
                    "seed": seed,
                    "winner": outcome.winner.name,
                    "loser": outcome.loser.name,
                    "winner_side": outcome.winner_side,
                    "decision": outcome.decision,
                    "summary": outcome.summary,
                    "standings": standings,
                    "log": log,
                    "elapsed_seconds": elapsed.as_secs_f64(),
                });
                let text = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
                println!("{}", text);
            }
        }
        return Ok(());
    }

    let series = if args.parallel {
        let threads = args.threads.unwrap_or_else(num_cpus::get);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| format!("Error building thread pool: {}", e))?;
        pool.install(|| run_series(&player, &opponent, config.settings, args.num_sims, seed, true))
    } else {
        run_series(&player, &opponent, config.settings, args.num_sims, seed, false)
    };
    let stats = series.map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();

    match args.output {
        OutputFormat::Text => {
            println!("=== Arena Series Results ===");
            println!("{} vs {}", player.display_name(), opponent.display_name());
            println!("Battles: {} (base seed {})", stats.battles, seed);
            println!();
            println!(
                "Player Wins: {} ({:.2}%)",
                stats.player_wins,
                stats.player_win_rate * 100.0
            );
            println!("Opponent Wins: {}", stats.opponent_wins);
            println!(
                "Decisions: {} KO, {} double KO, {} turn cap",
                stats.knockouts, stats.double_knockouts, stats.turn_cap_decisions
            );
            println!();
            println!("--- Combat Stats ---");
            println!("Average Turns: {:.2} ± {:.2}", stats.avg_turns, stats.std_turns);
            println!("Turn Range: {} - {}", stats.min_turns, stats.max_turns);
            println!("Average Rounds: {:.2}", stats.avg_rounds);
            println!("Avg Damage Dealt: {:.0}", stats.avg_damage);
            println!("Avg Crits: {:.2}", stats.avg_crits);
            println!("Avg Dodges: {:.2}", stats.avg_dodges);

            if args.timing {
                println!();
                println!("--- Performance ---");
                println!("Total time: {:.3}s", elapsed.as_secs_f64());
                println!(
                    "Per battle: {:.3}ms",
                    elapsed.as_secs_f64() * 1000.0 / args.num_sims as f64
                );
                println!("Battles/sec: {:.0}", args.num_sims as f64 / elapsed.as_secs_f64());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "battles": args.num_sims,
                "seed": seed,
                "parallel": args.parallel,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "stats": stats,
            });
            let text = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
            println!("{}", text);
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
