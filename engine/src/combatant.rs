use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyProfile;
use crate::scale;

/// A bounded resource such as hp or mp. `current` always lies in `0..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub current: i32,
    pub max: i32,
}

impl Pool {
    pub fn full(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0
    }
}

fn clamp_into(value: i64, max: i32) -> i32 {
    value.clamp(0, i64::from(max.max(0))) as i32
}

/// Subtract `amount`; returns the new value clamped to `[0, max]`.
pub fn apply_damage(pool: &mut Pool, amount: i32) -> i32 {
    pool.current = clamp_into(i64::from(pool.current) - i64::from(amount), pool.max);
    pool.current
}

/// Add `amount`; returns the new value clamped to `[0, max]`.
pub fn apply_heal(pool: &mut Pool, amount: i32) -> i32 {
    pool.current = clamp_into(i64::from(pool.current) + i64::from(amount), pool.max);
    pool.current
}

/// Signed mp adjustment; returns the new value clamped to `[0, max]`.
pub fn apply_mp_change(pool: &mut Pool, delta: i32) -> i32 {
    apply_heal(pool, delta)
}

/// Optional parts of a player skill. Absent parts are skipped on use.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillEffect {
    pub damage: Option<i32>,
    pub sleep_chance: Option<f64>,
    pub heal: Option<i32>,
    pub mp_gain: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSkill {
    pub key: String,
    pub name: String,
    pub mp_cost: i32,
    #[serde(default)]
    pub description: String,
    pub effect: SkillEffect,
    #[serde(default)]
    pub narration: String,
}

impl PlayerSkill {
    pub fn is_offensive(&self) -> bool {
        self.effect.damage.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub name: String,
    pub hp: Pool,
    pub mp: Pool,
    pub items: u32,
    pub skills: Vec<PlayerSkill>,
}

impl Player {
    pub fn new(name: impl Into<String>, profile: &DifficultyProfile, skills: Vec<PlayerSkill>) -> Self {
        Self {
            name: name.into(),
            hp: Pool::full(profile.player_max_hp),
            mp: Pool::full(profile.player_max_mp),
            items: profile.items,
            skills,
        }
    }

    pub fn skill(&self, key: &str) -> Option<&PlayerSkill> {
        self.skills.iter().find(|s| s.key == key)
    }
}

fn default_basic_power() -> i32 {
    14
}

fn default_nuke_power() -> i32 {
    16
}

fn default_crit_power() -> i32 {
    12
}

fn default_crit_multiplier() -> f64 {
    1.5
}

fn default_drain() -> i32 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DebuffKind {
    MpDrain,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuffKind {
    DoubleNext,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnemySkillEffect {
    Basic {
        #[serde(default = "default_basic_power")]
        power: i32,
    },
    Nuke {
        #[serde(default = "default_nuke_power")]
        power: i32,
    },
    Crit {
        #[serde(default = "default_crit_power")]
        power: i32,
        #[serde(default = "default_crit_multiplier")]
        crit_multiplier: f64,
    },
    Debuff {
        kind: DebuffKind,
        #[serde(default = "default_drain")]
        value: i32,
    },
    Buff {
        kind: BuffKind,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySkill {
    pub name: String,
    pub chance: f64,
    pub effect: EnemySkillEffect,
    #[serde(default)]
    pub narration: String,
}

impl EnemySkill {
    /// The fallback skill fires whenever it is reached.
    pub fn is_guaranteed(&self) -> bool {
        self.chance >= 1.0
    }

    pub fn is_buff(&self) -> bool {
        matches!(self.effect, EnemySkillEffect::Buff { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub name: String,
    pub sprite: String,
    pub base_hp: i32,
    pub skills: Vec<EnemySkill>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enemy {
    pub name: String,
    pub sprite: String,
    pub base_hp: i32,
    pub hp: Pool,
    pub skills: Vec<EnemySkill>,
    /// Skip-turn mark: the next enemy action is forfeited.
    pub asleep: bool,
}

impl Enemy {
    pub fn instantiate(template: &EnemyTemplate, hp_multiplier: f64) -> Self {
        Self {
            name: template.name.clone(),
            sprite: template.sprite.clone(),
            base_hp: template.base_hp,
            hp: Pool::full(scale(template.base_hp, hp_multiplier)),
            skills: template.skills.clone(),
            asleep: false,
        }
    }

    pub fn fallback_skill(&self) -> Option<&EnemySkill> {
        self.skills.iter().rev().find(|s| s.is_guaranteed())
    }

    pub fn is_defeated(&self) -> bool {
        self.hp.is_empty()
    }
}
