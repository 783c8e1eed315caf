//! The battle session: one player against an ordered encounter, one action at a time.
//!
//! The engine never waits on a clock. After a player action it parks in a pending
//! phase and reports the pause the presentation should observe through
//! [`Battle::pending_delay`]; the driver then calls [`Battle::advance`].

use std::mem;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::combatant::{Enemy, Player};
use crate::content::{Catalog, CatalogError};
use crate::difficulty::{Difficulty, DifficultyProfile};
use crate::encounter::{build_encounter, instantiate_encounter};
use crate::event::{ActionError, Bars, BattleEvent, Emphasis};
use crate::{Dice, RandomSource};

pub mod actions;
pub mod ai;

pub const DEFAULT_PLAYER_NAME: &str = "Sleepy Hero";
pub const FOLLOW_UP_DELAY: Duration = Duration::from_millis(350);
pub const ENEMY_DEFEAT_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Deserialize)]
pub struct BattleConfig {
    pub difficulty: Difficulty,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BattleConfig {
    pub fn new(difficulty: Difficulty, player_name: impl Into<String>) -> Self {
        Self {
            difficulty,
            player_name: player_name.into(),
            seed: None,
        }
    }

    /// A blank name falls back to [`DEFAULT_PLAYER_NAME`].
    pub fn resolved_name(&self) -> &str {
        let trimmed = self.player_name.trim();
        if trimmed.is_empty() {
            DEFAULT_PLAYER_NAME
        } else {
            trimmed
        }
    }

    pub fn dice(&self) -> Dice {
        Dice::from_seed(self.seed.unwrap_or_else(rand::random))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Attack,
    Skill(String),
    Item,
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingPlayerInput,
    /// The player's action resolved; the enemy acts on the next `advance`.
    EnemyActionPending,
    /// An armed double attack still owes its follow-up strike.
    FollowUpPending,
    /// The active enemy fell; the next one spawns on the next `advance`.
    EnemyDefeatedTransition,
    PlayerDefeated,
    AllEnemiesDefeated,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::PlayerDefeated | Phase::AllEnemiesDefeated)
    }

    pub fn is_pending(self) -> bool {
        matches!(
            self,
            Phase::EnemyActionPending | Phase::FollowUpPending | Phase::EnemyDefeatedTransition
        )
    }
}

pub struct Battle<R = Dice> {
    difficulty: Difficulty,
    profile: DifficultyProfile,
    player: Player,
    encounter: Vec<Enemy>,
    enemy_index: usize,
    enemy: Option<Enemy>,
    double_next: bool,
    turns: u32,
    phase: Phase,
    rng: R,
    pending: Vec<BattleEvent>,
    log: Vec<BattleEvent>,
}

impl<R: RandomSource> Battle<R> {
    /// Build the encounter and spawn the first enemy. The spawn events are
    /// waiting in [`Battle::take_events`].
    pub fn start(config: &BattleConfig, catalog: &Catalog, mut rng: R) -> Result<Self, CatalogError> {
        let profile = catalog.profile(config.difficulty)?.clone();
        let templates = build_encounter(catalog, config.difficulty, &mut rng)?;
        let encounter = instantiate_encounter(&templates, &profile);
        let player = Player::new(
            config.resolved_name(),
            &profile,
            catalog.player_skills.clone(),
        );
        info!(
            difficulty = %config.difficulty,
            player = %player.name,
            enemies = encounter.len(),
            "battle started"
        );

        let mut battle = Self {
            difficulty: config.difficulty,
            profile,
            player,
            encounter,
            enemy_index: 0,
            enemy: None,
            double_next: false,
            turns: 0,
            phase: Phase::EnemyDefeatedTransition,
            rng,
            pending: Vec::new(),
            log: Vec::new(),
        };
        battle.spawn_next();
        Ok(battle)
    }

    /// Resolve one player intent. Only accepted while awaiting input; a
    /// rejection leaves every resource and the turn counter untouched.
    pub fn submit(&mut self, action: PlayerAction) -> Result<Vec<BattleEvent>, ActionError> {
        if self.phase != Phase::AwaitingPlayerInput {
            debug!(phase = ?self.phase, ?action, "action rejected");
            return Err(ActionError::InvalidState);
        }
        let Some(enemy) = self.enemy.as_mut() else {
            return Err(ActionError::InvalidState);
        };

        let mut events = Vec::new();
        let emit = |ev: BattleEvent| events.push(ev);
        match &action {
            PlayerAction::Attack => actions::attack(&self.player, enemy, emit),
            PlayerAction::Skill(key) => {
                actions::use_skill(&mut self.player, enemy, key, &mut self.rng, emit)?
            }
            PlayerAction::Item => actions::use_item(&mut self.player, emit)?,
            PlayerAction::Rest => actions::rest(&mut self.player, emit)?,
        }

        self.turns += 1;
        debug!(turn = self.turns, ?action, "player action resolved");
        self.record(events);
        self.after_player_action();
        Ok(self.take_events())
    }

    /// Run the step the current pending phase is waiting on. Idle and
    /// terminal phases have nothing scheduled and return no events.
    pub fn advance(&mut self) -> Vec<BattleEvent> {
        match self.phase {
            Phase::EnemyActionPending => self.resolve_enemy_action(),
            Phase::FollowUpPending => self.resolve_follow_up(),
            Phase::EnemyDefeatedTransition => self.spawn_next(),
            Phase::AwaitingPlayerInput | Phase::PlayerDefeated | Phase::AllEnemiesDefeated => {}
        }
        self.take_events()
    }

    /// Advance through every pending step without pausing.
    pub fn settle(&mut self) -> Vec<BattleEvent> {
        let mut events = self.take_events();
        while self.phase.is_pending() {
            events.extend(self.advance());
        }
        events
    }

    /// How long the presentation should pause before the next `advance`.
    pub fn pending_delay(&self) -> Option<Duration> {
        match self.phase {
            Phase::EnemyActionPending => Some(Duration::from_millis(self.profile.delay_ms)),
            Phase::FollowUpPending => Some(FOLLOW_UP_DELAY),
            Phase::EnemyDefeatedTransition => Some(ENEMY_DEFEAT_DELAY),
            _ => None,
        }
    }

    /// Events produced since the last call.
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        mem::take(&mut self.pending)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True exactly while an accepted action is still being resolved.
    pub fn is_busy(&self) -> bool {
        self.phase.is_pending()
    }

    pub fn is_ended(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemy(&self) -> Option<&Enemy> {
        self.enemy.as_ref()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn double_attack_pending(&self) -> bool {
        self.double_next
    }

    /// `(current, total)` with `current` 1-based; 0 once the encounter is exhausted.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.encounter.len();
        let current = if self.enemy_index < total {
            self.enemy_index + 1
        } else {
            0
        };
        (current, total)
    }

    /// The final turn count, once every enemy is down.
    pub fn victory_turns(&self) -> Option<u32> {
        (self.phase == Phase::AllEnemiesDefeated).then_some(self.turns)
    }

    /// Every event emitted so far, in order.
    pub fn log(&self) -> &[BattleEvent] {
        &self.log
    }

    fn record(&mut self, events: impl IntoIterator<Item = BattleEvent>) {
        for ev in events {
            self.log.push(ev.clone());
            self.pending.push(ev);
        }
    }

    fn emit(&mut self, ev: BattleEvent) {
        self.record([ev]);
    }

    fn bars(&self) -> BattleEvent {
        BattleEvent::BarsChanged(Bars::capture(&self.player, self.enemy.as_ref()))
    }

    fn emit_bars(&mut self) {
        let bars = self.bars();
        self.emit(bars);
    }

    fn after_player_action(&mut self) {
        self.emit_bars();
        let Some(enemy) = self.enemy.as_mut() else {
            self.phase = Phase::AwaitingPlayerInput;
            return;
        };

        if enemy.is_defeated() {
            let name = enemy.name.clone();
            info!(enemy = %name, turn = self.turns, "enemy defeated");
            self.enemy = None;
            self.enemy_index += 1;
            self.emit(BattleEvent::narration(
                format!("{} is defeated!", name),
                Emphasis::Plain,
            ));
            self.emit(BattleEvent::EnemyDefeated { name });
            self.phase = Phase::EnemyDefeatedTransition;
            return;
        }

        if enemy.asleep {
            enemy.asleep = false;
            let text = format!("{} is fast asleep and cannot move!", enemy.name);
            self.emit(BattleEvent::narration(text, Emphasis::Plain));
            self.phase = Phase::AwaitingPlayerInput;
            return;
        }

        self.phase = Phase::EnemyActionPending;
    }

    fn spawn_next(&mut self) {
        let Some(next) = self.encounter.get(self.enemy_index).cloned() else {
            self.finish_victory();
            return;
        };
        info!(enemy = %next.name, hp = next.hp.max, index = self.enemy_index, "enemy spawned");
        self.emit(BattleEvent::EnemySpawned {
            name: next.name.clone(),
            sprite: next.sprite.clone(),
            hp: next.hp.current,
            max_hp: next.hp.max,
            index: self.enemy_index,
            total: self.encounter.len(),
        });
        self.emit(BattleEvent::narration(
            format!("A monster appears: {}!", next.name),
            Emphasis::Plain,
        ));
        self.enemy = Some(next);
        self.emit_bars();
        self.phase = Phase::AwaitingPlayerInput;
    }

    fn resolve_enemy_action(&mut self) {
        let Some(enemy) = self.enemy.as_ref() else {
            self.phase = Phase::AwaitingPlayerInput;
            return;
        };
        let armed_on_entry = self.double_next;

        let mut events = Vec::new();
        let action = ai::act(
            enemy,
            &mut self.player,
            self.profile.enemy_damage_multiplier,
            &mut self.rng,
            |ev| events.push(ev),
        );
        self.record(events);
        self.emit_bars();

        if action.armed_double {
            self.double_next = true;
        }
        if armed_on_entry && !action.was_buff {
            self.double_next = false;
            self.phase = Phase::FollowUpPending;
            return;
        }
        self.finish_enemy_turn();
    }

    fn resolve_follow_up(&mut self) {
        let Some(enemy) = self.enemy.as_ref() else {
            self.phase = Phase::AwaitingPlayerInput;
            return;
        };
        let mut events = Vec::new();
        let dmg = ai::follow_up(
            enemy,
            &mut self.player,
            self.profile.enemy_damage_multiplier,
            |ev| events.push(ev),
        );
        debug!(dmg, "follow-up strike");
        self.record(events);
        self.emit_bars();
        self.finish_enemy_turn();
    }

    fn finish_enemy_turn(&mut self) {
        if self.player.hp.is_empty() {
            info!(turn = self.turns, "player defeated");
            self.phase = Phase::PlayerDefeated;
            self.emit(BattleEvent::narration(
                "Your sleep has been shattered... GAME OVER",
                Emphasis::Plain,
            ));
            self.emit(BattleEvent::PlayerDefeated);
            return;
        }
        self.phase = Phase::AwaitingPlayerInput;
    }

    fn finish_victory(&mut self) {
        info!(turns = self.turns, "all enemies defeated");
        self.enemy = None;
        self.phase = Phase::AllEnemiesDefeated;
        self.emit(BattleEvent::narration(
            "Every monster is defeated! Restful sleep at last... zzz",
            Emphasis::Heal,
        ));
        self.emit(BattleEvent::AllEnemiesDefeated { turns: self.turns });
    }
}
