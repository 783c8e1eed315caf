use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Nightmare,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Nightmare,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
            Difficulty::Nightmare => "NIGHTMARE",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty '{0}' (expected EASY, NORMAL, HARD or NIGHTMARE)")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

/// How the Encounter Builder picks enemies for a difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EncounterPlan {
    /// The first `count` catalog entries, in catalog order.
    Fixed { count: usize },
    /// `count` entries drawn without replacement, in draw order.
    Random { count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub label: String,
    pub player_max_hp: i32,
    pub player_max_mp: i32,
    pub items: u32,
    pub enemy_hp_multiplier: f64,
    pub enemy_damage_multiplier: f64,
    /// Pause before the enemy acts. Presentation pacing only.
    pub delay_ms: u64,
    pub encounter: EncounterPlan,
}

/// Read-only table from difficulty key to profile, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DifficultyCatalog(IndexMap<Difficulty, DifficultyProfile>);

impl DifficultyCatalog {
    pub fn get(&self, key: Difficulty) -> Option<&DifficultyProfile> {
        self.0.get(&key)
    }

    pub fn get_mut(&mut self, key: Difficulty) -> Option<&mut DifficultyProfile> {
        self.0.get_mut(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, &DifficultyProfile)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn missing(&self) -> Vec<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .filter(|d| !self.0.contains_key(d))
            .collect()
    }
}
