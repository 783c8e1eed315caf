use tracing::debug;

use crate::combatant::{
    apply_damage, apply_mp_change, BuffKind, DebuffKind, Enemy, EnemySkill, EnemySkillEffect,
    Player,
};
use crate::event::{BattleEvent, Emphasis};
use crate::RandomSource;

/// Chance of a `crit` skill landing its multiplier. Independent of the trigger chance.
pub const CRIT_CHANCE: f64 = 0.35;
/// Power of the follow-up strike and of debuffs the engine cannot apply.
pub const FALLBACK_POWER: i32 = 12;

/// What an enemy action did beyond its direct effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAction {
    pub was_buff: bool,
    pub armed_double: bool,
    pub damage: i32,
}

/// Roll each skill in declared order; the first hit wins, else the guaranteed fallback.
pub fn choose_skill<'a>(enemy: &'a Enemy, rng: &mut impl RandomSource) -> Option<&'a EnemySkill> {
    enemy
        .skills
        .iter()
        .find(|s| rng.chance(s.chance))
        .or_else(|| enemy.fallback_skill())
}

fn scaled(power: f64, damage_multiplier: f64) -> i32 {
    (power * damage_multiplier).round() as i32
}

fn strike(
    enemy: &Enemy,
    player: &mut Player,
    skill_name: &str,
    lead: &str,
    dmg: i32,
    emphasis: Emphasis,
    emit: &mut impl FnMut(BattleEvent),
) {
    apply_damage(&mut player.hp, dmg);
    let lead = if lead.is_empty() {
        String::new()
    } else {
        format!("{} ", lead)
    };
    emit(BattleEvent::narration(
        format!(
            "{} uses {}! {}{} takes {} damage!",
            enemy.name, skill_name, lead, player.name, dmg
        ),
        emphasis,
    ));
}

/// Select and apply one enemy skill against the player.
pub fn act(
    enemy: &Enemy,
    player: &mut Player,
    damage_multiplier: f64,
    rng: &mut impl RandomSource,
    mut emit: impl FnMut(BattleEvent),
) -> EnemyAction {
    let Some(skill) = choose_skill(enemy, rng) else {
        let dmg = scaled(FALLBACK_POWER as f64, damage_multiplier);
        strike(enemy, player, "a wild swing", "", dmg, Emphasis::Damage, &mut emit);
        return EnemyAction {
            was_buff: false,
            armed_double: false,
            damage: dmg,
        };
    };
    debug!(enemy = %enemy.name, skill = %skill.name, "enemy skill chosen");

    let mut action = EnemyAction {
        was_buff: skill.is_buff(),
        armed_double: false,
        damage: 0,
    };

    match skill.effect {
        EnemySkillEffect::Basic { power } | EnemySkillEffect::Nuke { power } => {
            let dmg = scaled(power as f64, damage_multiplier);
            strike(enemy, player, &skill.name, &skill.narration, dmg, Emphasis::Damage, &mut emit);
            action.damage = dmg;
        }
        EnemySkillEffect::Crit {
            power,
            crit_multiplier,
        } => {
            let is_crit = rng.chance(CRIT_CHANCE);
            let multiplier = if is_crit { crit_multiplier } else { 1.0 };
            let dmg = scaled(power as f64 * multiplier, damage_multiplier);
            debug!(is_crit, dmg, "crit roll");
            let (lead, emphasis) = if is_crit {
                ("A devastating blow!!", Emphasis::Critical)
            } else {
                (skill.narration.as_str(), Emphasis::Damage)
            };
            strike(enemy, player, &skill.name, lead, dmg, emphasis, &mut emit);
            action.damage = dmg;
        }
        EnemySkillEffect::Debuff {
            kind: DebuffKind::MpDrain,
            value,
        } => {
            apply_mp_change(&mut player.mp, -value);
            emit(BattleEvent::narration(
                format!(
                    "{} uses {}! {} {} loses {} MP.",
                    enemy.name, skill.name, skill.narration, player.name, value
                ),
                Emphasis::Damage,
            ));
        }
        EnemySkillEffect::Debuff {
            kind: DebuffKind::Other,
            ..
        } => {
            let dmg = scaled(FALLBACK_POWER as f64, damage_multiplier);
            strike(enemy, player, &skill.name, "", dmg, Emphasis::Damage, &mut emit);
            action.damage = dmg;
        }
        EnemySkillEffect::Buff {
            kind: BuffKind::DoubleNext,
        } => {
            action.armed_double = true;
            emit(BattleEvent::narration(
                format!("{} uses {}! {}", enemy.name, skill.name, skill.narration),
                Emphasis::Plain,
            ));
        }
        EnemySkillEffect::Buff {
            kind: BuffKind::Other,
        } => {
            emit(BattleEvent::narration(
                format!("{} is watching you carefully...", enemy.name),
                Emphasis::Plain,
            ));
        }
    }
    action
}

/// The extra fixed-power strike a `doubleNext` buff arms.
pub fn follow_up(
    enemy: &Enemy,
    player: &mut Player,
    damage_multiplier: f64,
    mut emit: impl FnMut(BattleEvent),
) -> i32 {
    let dmg = scaled(FALLBACK_POWER as f64, damage_multiplier);
    apply_damage(&mut player.hp, dmg);
    emit(BattleEvent::narration(
        format!(
            "{} strikes again! {} takes {} damage!",
            enemy.name, player.name, dmg
        ),
        Emphasis::Damage,
    ));
    dmg
}
