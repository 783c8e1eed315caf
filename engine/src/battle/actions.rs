use tracing::debug;

use crate::combatant::{apply_damage, apply_heal, apply_mp_change, Enemy, Player};
use crate::event::{ActionError, BattleEvent, Emphasis};
use crate::RandomSource;

pub const ATTACK_DAMAGE: i32 = 20;
pub const ITEM_HEAL: i32 = 50;
pub const ITEM_MP_RESTORE: i32 = 20;
pub const REST_HEAL: i32 = 40;
pub const REST_MP_COST: i32 = 20;

/// A plain strike. Costs nothing and cannot fail.
pub fn attack(player: &Player, enemy: &mut Enemy, mut emit: impl FnMut(BattleEvent)) {
    let hp = apply_damage(&mut enemy.hp, ATTACK_DAMAGE);
    debug!(enemy = %enemy.name, hp, "player attack");
    emit(BattleEvent::narration(
        format!(
            "{} attacks! {} takes {} damage!",
            player.name, enemy.name, ATTACK_DAMAGE
        ),
        Emphasis::Damage,
    ));
}

/// Use a known skill. Nothing is spent or applied unless every check passes.
pub fn use_skill(
    player: &mut Player,
    enemy: &mut Enemy,
    key: &str,
    rng: &mut impl RandomSource,
    mut emit: impl FnMut(BattleEvent),
) -> Result<(), ActionError> {
    let skill = player
        .skill(key)
        .cloned()
        .ok_or_else(|| ActionError::UnknownSkill(key.to_string()))?;
    if player.mp.current < skill.mp_cost {
        return Err(ActionError::InsufficientMp {
            needed: skill.mp_cost,
            available: player.mp.current,
        });
    }

    apply_mp_change(&mut player.mp, -skill.mp_cost);

    let mut text = if skill.narration.is_empty() {
        format!("{} uses {}!", player.name, skill.name)
    } else {
        format!("{} uses {}! {}", player.name, skill.name, skill.narration)
    };

    if let Some(dmg) = skill.effect.damage {
        apply_damage(&mut enemy.hp, dmg);
        text.push_str(&format!(" {} takes {} damage!", enemy.name, dmg));
    }
    if let Some(chance) = skill.effect.sleep_chance {
        let slept = rng.chance(chance);
        debug!(chance, slept, "sleep roll");
        if slept {
            enemy.asleep = true;
            text.push_str(&format!(" {} is nodding off...", enemy.name));
        }
    }
    if let Some(heal) = skill.effect.heal {
        apply_heal(&mut player.hp, heal);
        text.push_str(&format!(" Recovered {} HP.", heal));
    }
    if let Some(gain) = skill.effect.mp_gain {
        apply_mp_change(&mut player.mp, gain);
        text.push_str(&format!(" Recovered {} MP.", gain));
    }

    let emphasis = if skill.is_offensive() {
        Emphasis::Damage
    } else {
        Emphasis::Heal
    };
    emit(BattleEvent::narration(text, emphasis));
    Ok(())
}

/// Consume one recovery item: +50 hp, +20 mp.
pub fn use_item(player: &mut Player, mut emit: impl FnMut(BattleEvent)) -> Result<(), ActionError> {
    if player.items == 0 {
        return Err(ActionError::NoItemsRemaining);
    }
    player.items -= 1;
    apply_heal(&mut player.hp, ITEM_HEAL);
    apply_mp_change(&mut player.mp, ITEM_MP_RESTORE);
    emit(BattleEvent::narration(
        format!(
            "{} uses a recovery item! +{} HP, +{} MP.",
            player.name, ITEM_HEAL, ITEM_MP_RESTORE
        ),
        Emphasis::Heal,
    ));
    Ok(())
}

/// Trade 20 mp for 40 hp.
pub fn rest(player: &mut Player, mut emit: impl FnMut(BattleEvent)) -> Result<(), ActionError> {
    if player.mp.current < REST_MP_COST {
        return Err(ActionError::InsufficientMp {
            needed: REST_MP_COST,
            available: player.mp.current,
        });
    }
    apply_heal(&mut player.hp, REST_HEAL);
    apply_mp_change(&mut player.mp, -REST_MP_COST);
    emit(BattleEvent::narration(
        format!(
            "{} takes a breather and regroups. +{} HP, -{} MP.",
            player.name, REST_HEAL, REST_MP_COST
        ),
        Emphasis::Heal,
    ));
    Ok(())
}
