use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use slumber_engine::config::{self, load_battle_config};
use slumber_engine::encounter::{build_encounter, instantiate_encounter};
use slumber_engine::{
    Battle, BattleConfig, BattleEvent, Catalog, Difficulty, Dice, Emphasis, PlayerAction,
    RandomSource,
};
use tracing::Level;

#[derive(Copy, Clone, ValueEnum)]
enum DumpFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Cmd {
    /// Fight an encounter interactively on stdin
    Play {
        /// EASY, NORMAL, HARD or NIGHTMARE
        #[arg(long, default_value = "NORMAL")]
        difficulty: Difficulty,
        /// Player name (blank uses the default hero)
        #[arg(long, default_value = "")]
        name: String,
        /// RNG seed for determinism (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Catalog override (.json, .yaml or .yml)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Battle config file; its difficulty wins over --difficulty
        #[arg(long)]
        config: Option<PathBuf>,
        /// Skip the pauses between steps
        #[arg(long, default_value_t = false)]
        fast: bool,
        /// Print events as JSON lines instead of prose
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the difficulty profiles
    Difficulties {
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Preview the enemies a difficulty would field for a seed
    Encounter {
        #[arg(long, default_value = "NORMAL")]
        difficulty: Difficulty,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Print the effective catalog
    CatalogDump {
        #[arg(long, value_enum, default_value_t = DumpFormat::Yaml)]
        format: DumpFormat,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Draw uniform numbers from the seeded dice
    Roll {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 5)]
        rolls: u32,
    },
}

#[derive(Parser)]
#[command(name = "slumber")]
#[command(about = "Slumber battle CLI harness")]
struct Cli {
    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(p) => config::load_catalog(p),
        None => Ok(Catalog::builtin()?),
    }
}

fn parse_action(line: &str, battle: &Battle) -> Option<PlayerAction> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?.to_lowercase();
    match head.as_str() {
        "a" | "attack" => Some(PlayerAction::Attack),
        "i" | "item" => Some(PlayerAction::Item),
        "r" | "rest" => Some(PlayerAction::Rest),
        "s" | "skill" => {
            let arg = parts.next()?;
            let skills = &battle.player().skills;
            let key = match arg.parse::<usize>() {
                Ok(n) if (1..=skills.len()).contains(&n) => skills[n - 1].key.clone(),
                _ => arg.to_string(),
            };
            Some(PlayerAction::Skill(key))
        }
        _ => None,
    }
}

fn print_events(events: &[BattleEvent], json: bool) -> anyhow::Result<()> {
    for ev in events {
        if json {
            println!("{}", ev.to_json_line()?);
            continue;
        }
        match ev {
            BattleEvent::Narration { text, emphasis } => {
                let mark = match emphasis {
                    Emphasis::Plain => " ",
                    Emphasis::Damage => "!",
                    Emphasis::Heal => "+",
                    Emphasis::Critical => "*",
                };
                println!("{} {}", mark, text);
            }
            BattleEvent::BarsChanged(bars) => {
                let enemy = match bars.enemy_hp {
                    Some((hp, max)) => format!("{}/{}", hp, max),
                    None => "--/--".to_string(),
                };
                println!(
                    "  [HP {}/{} | MP {}/{} | items x{} | enemy {}]",
                    bars.player_hp,
                    bars.player_max_hp,
                    bars.player_mp,
                    bars.player_max_mp,
                    bars.items,
                    enemy
                );
            }
            BattleEvent::EnemySpawned { index, total, .. } => {
                println!("--- enemy {}/{} ---", index + 1, total);
            }
            BattleEvent::EnemyDefeated { .. } => {}
            BattleEvent::AllEnemiesDefeated { turns } => {
                println!("*** VICTORY in {} turns ***", turns);
            }
            BattleEvent::PlayerDefeated => println!("*** DEFEAT ***"),
        }
    }
    Ok(())
}

fn print_skills(battle: &Battle) {
    for (i, s) in battle.player().skills.iter().enumerate() {
        println!("  {}. {} [{}] MP {} - {}", i + 1, s.name, s.key, s.mp_cost, s.description);
    }
}

fn play(cfg: BattleConfig, catalog: &Catalog, fast: bool, json: bool) -> anyhow::Result<()> {
    let mut battle = Battle::start(&cfg, catalog, cfg.dice())?;
    let (_, total) = battle.progress();
    if !json {
        println!(
            "{} vs {} enemies on {} ({})",
            battle.player().name,
            total,
            battle.difficulty(),
            battle.profile().label
        );
        println!("commands: a(ttack) | s(kill) <n|key> | i(tem) | r(est) | skills | q(uit)");
    }
    print_events(&battle.take_events(), json)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !battle.is_ended() {
        if !json {
            print!("> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed, "q" | "quit") {
            break;
        }
        if trimmed == "skills" {
            print_skills(&battle);
            continue;
        }
        let Some(action) = parse_action(trimmed, &battle) else {
            println!("  unknown command: {}", trimmed);
            continue;
        };

        match battle.submit(action) {
            Ok(events) => print_events(&events, json)?,
            Err(e) if e.is_user_visible() => {
                println!("  {}", e);
                continue;
            }
            Err(_) => continue,
        }

        while let Some(delay) = battle.pending_delay() {
            if !fast {
                thread::sleep(delay);
            }
            let events = battle.advance();
            print_events(&events, json)?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Cmd::Play {
            difficulty,
            name,
            seed,
            catalog,
            config,
            fast,
            json,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let mut cfg = match config.as_deref() {
                Some(path) => load_battle_config(path)?,
                None => BattleConfig::new(difficulty, ""),
            };
            if !name.trim().is_empty() {
                cfg.player_name = name;
            }
            if seed.is_some() {
                cfg.seed = seed;
            }
            play(cfg, &catalog, fast, json)?;
        }
        Cmd::Difficulties { catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            for (key, p) in catalog.difficulties.iter() {
                println!(
                    "{:<10} {:<10} hp={} mp={} items={} enemy_hp×{} enemy_dmg×{} delay={}ms",
                    key.key(),
                    p.label,
                    p.player_max_hp,
                    p.player_max_mp,
                    p.items,
                    p.enemy_hp_multiplier,
                    p.enemy_damage_multiplier,
                    p.delay_ms
                );
            }
        }
        Cmd::Encounter {
            difficulty,
            seed,
            catalog,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let profile = catalog.profile(difficulty)?;
            let mut dice = Dice::from_seed(seed);
            let templates = build_encounter(&catalog, difficulty, &mut dice)?;
            for (i, enemy) in instantiate_encounter(&templates, profile).iter().enumerate() {
                println!(
                    "{}. {} (base {} → hp {})",
                    i + 1,
                    enemy.name,
                    enemy.base_hp,
                    enemy.hp.max
                );
            }
        }
        Cmd::CatalogDump { format, catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            match format {
                DumpFormat::Json => println!("{}", catalog.to_json()?),
                DumpFormat::Yaml => print!("{}", catalog.to_yaml()?),
            }
        }
        Cmd::Roll { seed, rolls } => {
            let mut dice = Dice::from_seed(seed);
            for _ in 0..rolls {
                println!("{:.6}", dice.draw());
            }
        }
    }
    Ok(())
}
