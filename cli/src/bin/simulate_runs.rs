use clap::Parser;
use serde::Serialize;
use slumber_engine::config::load_catalog;
use slumber_engine::{
    Battle, BattleConfig, Catalog, Difficulty, Dice, Phase, Player, PlayerAction,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simulate-runs")]
#[command(about = "Monte Carlo sim: many autopiloted battles at one difficulty")]
struct Args {
    /// EASY, NORMAL, HARD or NIGHTMARE
    #[arg(long, default_value = "NORMAL")]
    difficulty: Difficulty,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Safety cap on player turns per trial
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Optional catalog file (.json, .yaml or .yml); built-ins otherwise
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    difficulty: Difficulty,
    trials: u32,
    wins: u32,
    losses: u32,
    unfinished: u32,
    win_rate: f64,
    avg_turns_wins: f64,
    median_turns_wins: u32,
}

/// Heal when low (items first, then rest), keep mp topped up, otherwise hit as hard as mp allows.
fn autopilot(p: &Player) -> PlayerAction {
    let hp_ratio = p.hp.current as f64 / p.hp.max.max(1) as f64;
    let affordable = |key: &str| p.skill(key).is_some_and(|s| s.mp_cost <= p.mp.current);

    if hp_ratio < 0.35 && p.items > 0 {
        PlayerAction::Item
    } else if hp_ratio < 0.5 && p.items == 0 && p.mp.current >= 20 {
        PlayerAction::Rest
    } else if affordable("moon_slash") {
        PlayerAction::Skill("moon_slash".into())
    } else if p.mp.current < 10 && affordable("mana_charge") {
        PlayerAction::Skill("mana_charge".into())
    } else {
        PlayerAction::Attack
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let catalog = match args.catalog.as_ref() {
        Some(path) => load_catalog(path)?,
        None => Catalog::builtin()?,
    };

    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut unfinished = 0u32;
    let mut turns_vec: Vec<u32> = Vec::with_capacity(args.trials as usize);

    for i in 0..args.trials {
        let trial_seed = args.seed.wrapping_add(i as u64);
        let cfg = BattleConfig::new(args.difficulty, "Autopilot");
        let mut battle = Battle::start(&cfg, &catalog, Dice::from_seed(trial_seed))?;

        while !battle.is_ended() && battle.turns() < args.max_turns {
            let action = autopilot(battle.player());
            if battle.submit(action).is_err() {
                // fall back to a plain attack
                battle.submit(PlayerAction::Attack)?;
            }
            battle.settle();
        }

        match battle.phase() {
            Phase::AllEnemiesDefeated => {
                wins += 1;
                turns_vec.push(battle.turns());
            }
            Phase::PlayerDefeated => losses += 1,
            _ => unfinished += 1,
        }
    }

    turns_vec.sort_unstable();
    let win_rate = if args.trials == 0 {
        0.0
    } else {
        wins as f64 / args.trials as f64
    };
    let avg_turns_wins = if turns_vec.is_empty() {
        0.0
    } else {
        turns_vec.iter().map(|&t| t as u64).sum::<u64>() as f64 / turns_vec.len() as f64
    };
    let median_turns_wins = if turns_vec.is_empty() {
        0
    } else {
        let m = turns_vec.len() / 2;
        if turns_vec.len() % 2 == 1 {
            turns_vec[m]
        } else {
            (turns_vec[m - 1] + turns_vec[m]) / 2
        }
    };

    let summary = Summary {
        difficulty: args.difficulty,
        trials: args.trials,
        wins,
        losses,
        unfinished,
        win_rate,
        avg_turns_wins,
        median_turns_wins,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("simulate-runs results");
    println!("---------------------");
    println!("difficulty:         {}", summary.difficulty);
    println!("trials:             {}", summary.trials);
    println!("wins / losses:      {} / {}", summary.wins, summary.losses);
    println!("unfinished:         {}", summary.unfinished);
    println!("win rate:           {:.1}%", summary.win_rate * 100.0);
    println!("avg turns (wins):   {:.2}", summary.avg_turns_wins);
    println!("median turns:       {}", summary.median_turns_wins);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hurt_player(hp: i32, mp: i32, items: u32) -> Player {
        let catalog = Catalog::builtin().unwrap();
        let profile = catalog.profile(Difficulty::Normal).unwrap();
        let mut p = Player::new("Autopilot", profile, catalog.player_skills.clone());
        p.hp.current = hp;
        p.mp.current = mp;
        p.items = items;
        p
    }

    #[test]
    fn low_hp_uses_an_item_first() {
        assert_eq!(autopilot(&hurt_player(30, 50, 2)), PlayerAction::Item);
    }

    #[test]
    fn rests_only_once_items_are_gone() {
        assert_eq!(
            autopilot(&hurt_player(40, 50, 2)),
            PlayerAction::Skill("moon_slash".into())
        );
        assert_eq!(autopilot(&hurt_player(40, 50, 0)), PlayerAction::Rest);
        assert_eq!(autopilot(&hurt_player(30, 50, 0)), PlayerAction::Rest);
    }

    #[test]
    fn recharges_when_dry() {
        assert_eq!(
            autopilot(&hurt_player(100, 5, 3)),
            PlayerAction::Skill("mana_charge".into())
        );
        assert_eq!(
            autopilot(&hurt_player(100, 10, 3)),
            PlayerAction::Skill("moon_slash".into())
        );
    }
}
