//! Loot tables rolled when an agent's corpse settles.

use rand::Rng;
use serde::Deserialize;

/// One possible drop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LootEntry {
    pub item_id: u32,
    #[serde(default = "default_amount")]
    pub amount: u32,
    /// Probability in `[0, 1]`
    pub chance: f32,
}

fn default_amount() -> u32 {
    1
}

/// What actually dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootDrop {
    pub item_id: u32,
    pub amount: u32,
}

/// Independent per-entry drop chances.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct LootTable {
    pub entries: Vec<LootEntry>,
}

impl LootTable {
    pub fn new(entries: Vec<LootEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Each entry drops when a uniform sample in `[0, 1)` is `<= chance`.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<LootDrop> {
        self.entries
            .iter()
            .filter(|entry| entry.chance > 0.0 && rng.gen::<f32>() <= entry.chance)
            .map(|entry| LootDrop {
                item_id: entry.item_id,
                amount: entry.amount,
            })
            .collect()
    }
}
