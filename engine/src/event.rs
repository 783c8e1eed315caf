use serde::Serialize;

use crate::combatant::{Enemy, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Plain,
    Damage,
    Heal,
    Critical,
}

/// Resource readout sent with every `BarsChanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bars {
    pub player_hp: i32,
    pub player_max_hp: i32,
    pub player_mp: i32,
    pub player_max_mp: i32,
    pub items: u32,
    /// `(hp, max_hp)` of the active enemy, if any.
    pub enemy_hp: Option<(i32, i32)>,
}

impl Bars {
    pub fn capture(player: &Player, enemy: Option<&Enemy>) -> Self {
        Self {
            player_hp: player.hp.current,
            player_max_hp: player.hp.max,
            player_mp: player.mp.current,
            player_max_mp: player.mp.max,
            items: player.items,
            enemy_hp: enemy.map(|e| (e.hp.current, e.hp.max)),
        }
    }
}

/// Notifications from the engine to the Presentation Layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BattleEvent {
    EnemySpawned {
        name: String,
        sprite: String,
        hp: i32,
        max_hp: i32,
        index: usize,
        total: usize,
    },
    Narration {
        text: String,
        emphasis: Emphasis,
    },
    BarsChanged(Bars),
    EnemyDefeated {
        name: String,
    },
    AllEnemiesDefeated {
        turns: u32,
    },
    PlayerDefeated,
}

impl BattleEvent {
    pub fn narration(text: impl Into<String>, emphasis: Emphasis) -> Self {
        BattleEvent::Narration {
            text: text.into(),
            emphasis,
        }
    }

    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Why a submitted player action was not resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Busy or finished. Drivers drop this silently.
    #[error("action rejected: not the player's turn")]
    InvalidState,
    #[error("not enough MP: need {needed}, have {available}")]
    InsufficientMp { needed: i32, available: i32 },
    #[error("no recovery items remaining")]
    NoItemsRemaining,
    #[error("unknown skill '{0}'")]
    UnknownSkill(String),
}

impl ActionError {
    /// Whether a player should be shown this rejection.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ActionError::InvalidState)
    }
}
