use std::time::Duration;

use slumber_engine::combatant::{BuffKind, EnemySkill, EnemySkillEffect, EnemyTemplate};
use slumber_engine::{
    ActionError, Battle, BattleConfig, BattleEvent, Catalog, Difficulty, Dice, Phase, PlayerAction,
};

fn start(catalog: &Catalog, difficulty: Difficulty, draws: Vec<f64>) -> Battle {
    let cfg = BattleConfig::new(difficulty, "Tester");
    let mut battle = Battle::start(&cfg, catalog, Dice::from_scripted(draws)).unwrap();
    battle.take_events();
    battle
}

fn narrations(events: &[BattleEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::Narration { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn djinn() -> EnemyTemplate {
    EnemyTemplate {
        name: "Caffeine Djinn".into(),
        sprite: "enemy-caffeine".into(),
        base_hp: 200,
        skills: vec![
            EnemySkill {
                name: "Wired Rush".into(),
                chance: 0.5,
                effect: EnemySkillEffect::Buff {
                    kind: BuffKind::DoubleNext,
                },
                narration: "It will strike twice next turn!".into(),
            },
            EnemySkill {
                name: "Basic Attack".into(),
                chance: 1.0,
                effect: EnemySkillEffect::Basic { power: 15 },
                narration: String::new(),
            },
        ],
    }
}

#[test]
fn starts_awaiting_input_with_first_enemy() {
    let catalog = Catalog::builtin().unwrap();
    let cfg = BattleConfig::new(Difficulty::Normal, "");
    let mut battle = Battle::start(&cfg, &catalog, Dice::from_seed(1)).unwrap();
    assert_eq!(battle.phase(), Phase::AwaitingPlayerInput);
    assert!(!battle.is_busy());
    assert_eq!(battle.player().name, "Sleepy Hero");
    assert_eq!(battle.progress(), (1, 3));
    let events = battle.take_events();
    assert!(matches!(events[0], BattleEvent::EnemySpawned { index: 0, total: 3, .. }));
    assert!(battle.take_events().is_empty());
}

#[test]
fn four_attacks_fell_a_seventy_hp_enemy() {
    let mut catalog = Catalog::builtin().unwrap();
    let ghost = catalog.enemies.remove(1);
    catalog.enemies.insert(0, ghost);
    let mut battle = start(&catalog, Difficulty::Normal, vec![]);
    assert_eq!(battle.enemy().unwrap().hp.max, 70);

    for expected in [50, 30, 10] {
        let events = battle.submit(PlayerAction::Attack).unwrap();
        assert!(!events.iter().any(|e| matches!(e, BattleEvent::EnemyDefeated { .. })));
        assert_eq!(battle.enemy().unwrap().hp.current, expected);
        assert_eq!(battle.phase(), Phase::EnemyActionPending);
        battle.settle();
    }

    let events = battle.submit(PlayerAction::Attack).unwrap();
    assert!(events.contains(&BattleEvent::EnemyDefeated {
        name: "Midnight Notification Ghost".into()
    }));
    assert_eq!(battle.phase(), Phase::EnemyDefeatedTransition);
    assert!(battle.enemy().is_none());
    // three enemy turns of the ghost's 14-power basic attack
    assert_eq!(battle.player().hp.current, 58);

    let events = battle.advance();
    assert!(matches!(events[0], BattleEvent::EnemySpawned { index: 1, .. }));
    assert_eq!(battle.phase(), Phase::AwaitingPlayerInput);
}

#[test]
fn skill_without_enough_mp_changes_nothing() {
    let mut catalog = Catalog::builtin().unwrap();
    catalog
        .difficulties
        .get_mut(Difficulty::Normal)
        .unwrap()
        .player_max_mp = 10;
    let mut battle = start(&catalog, Difficulty::Normal, vec![]);

    let err = battle
        .submit(PlayerAction::Skill("sleep_song".into()))
        .unwrap_err();
    assert_eq!(err, ActionError::InsufficientMp { needed: 15, available: 10 });
    assert!(err.is_user_visible());
    assert_eq!(battle.player().mp.current, 10);
    assert_eq!(battle.player().hp.current, 100);
    assert_eq!(battle.enemy().unwrap().hp.current, 60);
    assert_eq!(battle.phase(), Phase::AwaitingPlayerInput);
    assert_eq!(battle.turns(), 0);
    assert!(battle.take_events().is_empty());
}

#[test]
fn zero_cost_skill_works_at_zero_mp() {
    let mut catalog = Catalog::builtin().unwrap();
    catalog
        .difficulties
        .get_mut(Difficulty::Normal)
        .unwrap()
        .player_max_mp = 10;
    let mut battle = start(&catalog, Difficulty::Normal, vec![]);

    battle.submit(PlayerAction::Skill("moon_slash".into())).unwrap();
    assert_eq!(battle.player().mp.current, 0);
    assert_eq!(battle.enemy().unwrap().hp.current, 30);
    battle.settle();

    battle.submit(PlayerAction::Skill("mana_charge".into())).unwrap();
    assert_eq!(battle.player().mp.current, 10);
    assert_eq!(battle.turns(), 2);
}

#[test]
fn unknown_skill_is_rejected() {
    let catalog = Catalog::builtin().unwrap();
    let mut battle = start(&catalog, Difficulty::Normal, vec![]);
    assert_eq!(
        battle.submit(PlayerAction::Skill("fireball".into())),
        Err(ActionError::UnknownSkill("fireball".into()))
    );
    assert_eq!(battle.turns(), 0);
}

#[test]
fn doubled_attack_lands_as_two_hits() {
    let mut catalog = Catalog::builtin().unwrap();
    catalog.enemies = vec![djinn()];
    // Turn 1: 0.1 fires Wired Rush. Turn 2: 0.9 misses it, the basic attack follows.
    let mut battle = start(&catalog, Difficulty::Normal, vec![0.1, 0.9]);

    battle.submit(PlayerAction::Attack).unwrap();
    let events = battle.advance();
    assert!(battle.double_attack_pending());
    assert_eq!(battle.player().hp.current, 100);
    assert_eq!(battle.phase(), Phase::AwaitingPlayerInput);
    assert!(narrations(&events)[0].contains("Wired Rush"));

    battle.submit(PlayerAction::Attack).unwrap();
    let primary = battle.advance();
    assert_eq!(battle.player().hp.current, 85);
    assert_eq!(battle.phase(), Phase::FollowUpPending);
    assert!(battle.is_busy());
    assert_eq!(battle.pending_delay(), Some(Duration::from_millis(350)));
    assert!(narrations(&primary)[0].contains("takes 15 damage"));

    let follow = battle.advance();
    assert_eq!(battle.player().hp.current, 73);
    assert!(narrations(&follow)[0].contains("strikes again! Tester takes 12 damage"));
    assert!(!battle.double_attack_pending());
    assert_eq!(battle.phase(), Phase::AwaitingPlayerInput);
}

#[test]
fn buff_while_armed_does_not_follow_up() {
    let mut catalog = Catalog::builtin().unwrap();
    catalog.enemies = vec![djinn()];
    let mut battle = start(&catalog, Difficulty::Normal, vec![0.1, 0.1]);

    for _ in 0..2 {
        battle.submit(PlayerAction::Attack).unwrap();
        battle.advance();
        assert_eq!(battle.phase(), Phase::AwaitingPlayerInput);
    }
    assert!(battle.double_attack_pending());
    assert_eq!(battle.player().hp.current, 100);
}

#[test]
fn sleeping_enemy_forfeits_its_turn() {
    let catalog = Catalog::builtin().unwrap();
    let mut battle = start(&catalog, Difficulty::Normal, vec![0.1]);

    let events = battle.submit(PlayerAction::Skill("sleep_song".into())).unwrap();
    assert_eq!(battle.phase(), Phase::AwaitingPlayerInput);
    assert!(!battle.is_busy());
    assert!(battle.pending_delay().is_none());
    assert_eq!(battle.player().hp.current, 100);
    assert_eq!(battle.player().mp.current, 35);
    assert_eq!(battle.enemy().unwrap().hp.current, 46);
    assert!(!battle.enemy().unwrap().asleep);

    let lines = narrations(&events);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Sleep Song"));
    assert!(lines[1].contains("fast asleep"));

    // The mark is spent; the next action gets an answer again.
    battle.submit(PlayerAction::Attack).unwrap();
    assert_eq!(battle.phase(), Phase::EnemyActionPending);
}

#[test]
fn items_and_rest_respect_their_guards() {
    let mut catalog = Catalog::builtin().unwrap();
    {
        let normal = catalog.difficulties.get_mut(Difficulty::Normal).unwrap();
        normal.items = 1;
        normal.player_max_mp = 25;
    }
    let mut battle = start(&catalog, Difficulty::Normal, vec![]);

    battle.submit(PlayerAction::Rest).unwrap();
    assert_eq!(battle.player().mp.current, 5);
    assert_eq!(battle.player().hp.current, 100);
    battle.settle();
    assert_eq!(battle.player().hp.current, 85);

    assert_eq!(
        battle.submit(PlayerAction::Rest),
        Err(ActionError::InsufficientMp { needed: 20, available: 5 })
    );

    battle.submit(PlayerAction::Item).unwrap();
    assert_eq!(battle.player().items, 0);
    assert_eq!(battle.player().hp.current, 100);
    assert_eq!(battle.player().mp.current, 25);
    battle.settle();

    assert_eq!(battle.submit(PlayerAction::Item), Err(ActionError::NoItemsRemaining));
    assert_eq!(battle.turns(), 2);
}

#[test]
fn busy_battle_ignores_actions() {
    let catalog = Catalog::builtin().unwrap();
    let mut battle = start(&catalog, Difficulty::Normal, vec![]);
    battle.submit(PlayerAction::Attack).unwrap();
    assert!(battle.is_busy());
    assert_eq!(battle.pending_delay(), Some(Duration::from_millis(800)));

    let hp = battle.player().hp;
    let enemy_hp = battle.enemy().unwrap().hp;
    for action in [
        PlayerAction::Attack,
        PlayerAction::Item,
        PlayerAction::Rest,
        PlayerAction::Skill("moon_slash".into()),
    ] {
        let err = battle.submit(action).unwrap_err();
        assert_eq!(err, ActionError::InvalidState);
        assert!(!err.is_user_visible());
    }
    assert_eq!(battle.player().hp, hp);
    assert_eq!(battle.player().items, 3);
    assert_eq!(battle.enemy().unwrap().hp, enemy_hp);
    assert_eq!(battle.turns(), 1);
}

#[test]
fn player_defeat_is_final() {
    let mut catalog = Catalog::builtin().unwrap();
    catalog
        .difficulties
        .get_mut(Difficulty::Normal)
        .unwrap()
        .player_max_hp = 10;
    let mut battle = start(&catalog, Difficulty::Normal, vec![]);

    battle.submit(PlayerAction::Attack).unwrap();
    let events = battle.settle();
    assert_eq!(battle.phase(), Phase::PlayerDefeated);
    assert!(battle.is_ended());
    assert_eq!(events.last(), Some(&BattleEvent::PlayerDefeated));
    assert_eq!(battle.player().hp.current, 0);

    assert_eq!(battle.submit(PlayerAction::Attack), Err(ActionError::InvalidState));
    assert!(battle.advance().is_empty());
    assert_eq!(battle.turns(), 1);
    assert_eq!(battle.victory_turns(), None);
}

#[test]
fn victory_reports_every_resolved_turn() {
    let catalog = Catalog::builtin().unwrap();
    let mut battle = start(&catalog, Difficulty::Easy, vec![]);
    let mut submitted = 0;

    while !battle.is_ended() {
        let action = if battle.player().hp.current < 40 {
            PlayerAction::Item
        } else {
            PlayerAction::Attack
        };
        battle.submit(action).unwrap();
        submitted += 1;
        // A second intent while the enemy is pending is dropped and not counted.
        if battle.is_busy() {
            assert_eq!(battle.submit(PlayerAction::Attack), Err(ActionError::InvalidState));
        }
        battle.settle();
    }

    assert_eq!(battle.phase(), Phase::AllEnemiesDefeated);
    assert_eq!(battle.victory_turns(), Some(submitted));
    assert_eq!(
        battle.log().last(),
        Some(&BattleEvent::AllEnemiesDefeated { turns: submitted })
    );
    let defeated = battle
        .log()
        .iter()
        .filter(|e| matches!(e, BattleEvent::EnemyDefeated { .. }))
        .count();
    assert_eq!(defeated, 3);
    assert_eq!(battle.progress(), (0, 3));
    assert_eq!(battle.submit(PlayerAction::Attack), Err(ActionError::InvalidState));
}

#[test]
fn empty_encounter_is_an_immediate_win() {
    let mut catalog = Catalog::builtin().unwrap();
    catalog.enemies.clear();
    let cfg = BattleConfig::new(Difficulty::Hard, "Tester");
    let mut battle = Battle::start(&cfg, &catalog, Dice::from_seed(5)).unwrap();
    assert_eq!(battle.phase(), Phase::AllEnemiesDefeated);
    assert_eq!(
        battle.take_events().last(),
        Some(&BattleEvent::AllEnemiesDefeated { turns: 0 })
    );
}

#[test]
fn seeded_battles_replay_identically() {
    let catalog = Catalog::builtin().unwrap();
    let run = |seed: u64| {
        let cfg = BattleConfig::new(Difficulty::Nightmare, "Tester");
        let mut battle = Battle::start(&cfg, &catalog, Dice::from_seed(seed)).unwrap();
        for _ in 0..12 {
            if battle.is_ended() {
                break;
            }
            let _ = battle.submit(PlayerAction::Skill("sleep_song".into()));
            let _ = battle.submit(PlayerAction::Attack);
            battle.settle();
        }
        battle.log().to_vec()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn follow_up_still_lands_on_a_downed_player() {
    let mut catalog = Catalog::builtin().unwrap();
    catalog.enemies = vec![djinn()];
    catalog
        .difficulties
        .get_mut(Difficulty::Normal)
        .unwrap()
        .player_max_hp = 15;
    let mut battle = start(&catalog, Difficulty::Normal, vec![0.1, 0.9]);

    battle.submit(PlayerAction::Attack).unwrap();
    battle.advance();
    assert!(battle.double_attack_pending());

    battle.submit(PlayerAction::Attack).unwrap();
    let primary = battle.advance();
    assert_eq!(battle.player().hp.current, 0);
    assert_eq!(battle.phase(), Phase::FollowUpPending);
    assert!(!battle.is_ended());
    assert!(!primary.contains(&BattleEvent::PlayerDefeated));

    let follow = battle.advance();
    assert!(narrations(&follow)[0].contains("strikes again!"));
    assert_eq!(battle.player().hp.current, 0);
    assert_eq!(battle.phase(), Phase::PlayerDefeated);
    assert_eq!(follow.last(), Some(&BattleEvent::PlayerDefeated));
    let defeats = battle
        .log()
        .iter()
        .filter(|e| **e == BattleEvent::PlayerDefeated)
        .count();
    assert_eq!(defeats, 1);
}

#[test]
fn armed_double_attack_carries_to_the_next_enemy() {
    let mut catalog = Catalog::builtin().unwrap();
    let mut first = djinn();
    first.base_hp = 40;
    catalog.enemies = vec![first, djinn()];
    // 0.1 arms Wired Rush on the first djinn; 0.9 lets the second one use its basic attack.
    let mut battle = start(&catalog, Difficulty::Normal, vec![0.1, 0.9]);

    battle.submit(PlayerAction::Attack).unwrap();
    battle.advance();
    assert!(battle.double_attack_pending());

    battle.submit(PlayerAction::Attack).unwrap();
    assert_eq!(battle.phase(), Phase::EnemyDefeatedTransition);
    battle.advance();
    assert_eq!(battle.progress(), (2, 2));
    assert!(battle.double_attack_pending());

    battle.submit(PlayerAction::Attack).unwrap();
    battle.advance();
    assert_eq!(battle.player().hp.current, 85);
    assert_eq!(battle.phase(), Phase::FollowUpPending);

    battle.advance();
    assert_eq!(battle.player().hp.current, 73);
    assert!(!battle.double_attack_pending());
    assert_eq!(battle.phase(), Phase::AwaitingPlayerInput);
}
