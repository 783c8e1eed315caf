use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::combatant::{EnemyTemplate, PlayerSkill};
use crate::difficulty::{Difficulty, DifficultyCatalog, DifficultyProfile};

pub fn builtin_difficulties() -> &'static str {
    include_str!("../content/difficulties.json")
}

pub fn builtin_player_skills() -> &'static str {
    include_str!("../content/player_skills.json")
}

pub fn builtin_enemies() -> &'static str {
    include_str!("../content/enemies.json")
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse built-in {section} content: {source}")]
    Builtin {
        section: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("difficulty {0} is missing from the catalog")]
    MissingDifficulty(Difficulty),
    #[error("difficulty {difficulty} has {pool} {value}; {pool} must be {expected}")]
    BadPlayerPool {
        difficulty: Difficulty,
        pool: &'static str,
        value: i32,
        expected: &'static str,
    },
    #[error("duplicate player skill key '{0}'")]
    DuplicateSkill(String),
    #[error("player skill '{skill}' has a negative mp cost ({cost})")]
    NegativeMpCost { skill: String, cost: i32 },
    #[error("player skill '{skill}' has {field} {value}; it must be positive")]
    BadSkillEffect {
        skill: String,
        field: &'static str,
        value: i32,
    },
    #[error("enemy '{0}' must have a positive base hp")]
    BadBaseHp(String),
    #[error("enemy '{enemy}' needs exactly one guaranteed fallback skill, found {found}")]
    Fallback { enemy: String, found: usize },
    #[error("skill '{skill}' of '{owner}' has chance {chance} outside [0, 1]")]
    ChanceOutOfRange {
        owner: String,
        skill: String,
        chance: f64,
    },
}

/// Everything a battle needs that is not per-session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub difficulties: DifficultyCatalog,
    pub player_skills: Vec<PlayerSkill>,
    pub enemies: Vec<EnemyTemplate>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        let difficulties = serde_json::from_str(builtin_difficulties()).map_err(|source| {
            CatalogError::Builtin {
                section: "difficulties",
                source,
            }
        })?;
        let player_skills = serde_json::from_str(builtin_player_skills()).map_err(|source| {
            CatalogError::Builtin {
                section: "player skills",
                source,
            }
        })?;
        let enemies =
            serde_json::from_str(builtin_enemies()).map_err(|source| CatalogError::Builtin {
                section: "enemies",
                source,
            })?;
        let catalog = Self {
            difficulties,
            player_skills,
            enemies,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn profile(&self, difficulty: Difficulty) -> Result<&DifficultyProfile, CatalogError> {
        self.difficulties
            .get(difficulty)
            .ok_or(CatalogError::MissingDifficulty(difficulty))
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(missing) = self.difficulties.missing().into_iter().next() {
            return Err(CatalogError::MissingDifficulty(missing));
        }
        for (difficulty, profile) in self.difficulties.iter() {
            if profile.player_max_hp <= 0 {
                return Err(CatalogError::BadPlayerPool {
                    difficulty,
                    pool: "player_max_hp",
                    value: profile.player_max_hp,
                    expected: "positive",
                });
            }
            if profile.player_max_mp < 0 {
                return Err(CatalogError::BadPlayerPool {
                    difficulty,
                    pool: "player_max_mp",
                    value: profile.player_max_mp,
                    expected: "zero or more",
                });
            }
        }

        let mut keys = HashSet::new();
        for skill in &self.player_skills {
            if !keys.insert(skill.key.as_str()) {
                return Err(CatalogError::DuplicateSkill(skill.key.clone()));
            }
            if skill.mp_cost < 0 {
                return Err(CatalogError::NegativeMpCost {
                    skill: skill.key.clone(),
                    cost: skill.mp_cost,
                });
            }
            let effect = &skill.effect;
            for (field, value) in [
                ("damage", effect.damage),
                ("heal", effect.heal),
                ("mp_gain", effect.mp_gain),
            ] {
                if let Some(value) = value.filter(|v| *v <= 0) {
                    return Err(CatalogError::BadSkillEffect {
                        skill: skill.key.clone(),
                        field,
                        value,
                    });
                }
            }
            if let Some(chance) = skill.effect.sleep_chance {
                check_chance(&skill.key, &skill.name, chance)?;
            }
        }

        for enemy in &self.enemies {
            if enemy.base_hp <= 0 {
                return Err(CatalogError::BadBaseHp(enemy.name.clone()));
            }
            for skill in &enemy.skills {
                check_chance(&enemy.name, &skill.name, skill.chance)?;
            }
            let found = enemy.skills.iter().filter(|s| s.is_guaranteed()).count();
            if found != 1 {
                return Err(CatalogError::Fallback {
                    enemy: enemy.name.clone(),
                    found,
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

fn check_chance(owner: &str, skill: &str, chance: f64) -> Result<(), CatalogError> {
    if (0.0..=1.0).contains(&chance) {
        Ok(())
    } else {
        Err(CatalogError::ChanceOutOfRange {
            owner: owner.to_string(),
            skill: skill.to_string(),
            chance,
        })
    }
}
