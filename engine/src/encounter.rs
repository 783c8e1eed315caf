use tracing::{debug, warn};

use crate::combatant::{Enemy, EnemyTemplate};
use crate::content::{Catalog, CatalogError};
use crate::difficulty::{Difficulty, DifficultyProfile, EncounterPlan};
use crate::RandomSource;

/// Draw up to `n` items without replacement, in draw order.
/// A pool smaller than `n` yields every item.
pub fn sample_without_replacement<T: Clone>(
    items: &[T],
    n: usize,
    rng: &mut impl RandomSource,
) -> Vec<T> {
    let mut pool: Vec<T> = items.to_vec();
    let take = n.min(pool.len());
    let mut out = Vec::with_capacity(take);
    while out.len() < take {
        let idx = rng.index(pool.len());
        out.push(pool.remove(idx));
    }
    out
}

/// Pick the enemy templates for one plan, in the order they will be fought.
pub fn plan_encounter(
    plan: EncounterPlan,
    enemies: &[EnemyTemplate],
    rng: &mut impl RandomSource,
) -> Vec<EnemyTemplate> {
    let (wanted, picked) = match plan {
        EncounterPlan::Fixed { count } => (
            count,
            enemies.iter().take(count).cloned().collect::<Vec<_>>(),
        ),
        EncounterPlan::Random { count } => (count, sample_without_replacement(enemies, count, rng)),
    };
    if picked.len() < wanted {
        warn!(
            wanted,
            available = enemies.len(),
            "encounter exhausted the enemy catalog; fighting fewer enemies"
        );
    }
    picked
}

/// The ordered enemy templates a battle at `difficulty` will face.
pub fn build_encounter(
    catalog: &Catalog,
    difficulty: Difficulty,
    rng: &mut impl RandomSource,
) -> Result<Vec<EnemyTemplate>, CatalogError> {
    let profile = catalog.profile(difficulty)?;
    let picked = plan_encounter(profile.encounter, &catalog.enemies, rng);
    debug!(
        %difficulty,
        enemies = ?picked.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
        "encounter built"
    );
    Ok(picked)
}

/// Scale each template's hp by the profile's enemy hp multiplier.
pub fn instantiate_encounter(templates: &[EnemyTemplate], profile: &DifficultyProfile) -> Vec<Enemy> {
    templates
        .iter()
        .map(|t| Enemy::instantiate(t, profile.enemy_hp_multiplier))
        .collect()
}
