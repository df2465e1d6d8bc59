//! Island map progress. Island 1 is always open; finishing 1 or 2 opens the next,
//! finishing 3 opens the hard tier (4-6) at once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const ISLAND_COUNT: u8 = 6;
/// First island of the hard tier; sessions there run in hard mode.
pub const HARD_TIER_FROM: u8 = 4;

/// Suggested difficulty for the next islands, from the last finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IslandDifficulty {
  Easy,
  Medium,
  Hard,
}

impl IslandDifficulty {
  pub fn from_mistakes(mistakes: u32) -> Self {
    match mistakes {
      0 | 1 => IslandDifficulty::Hard,
      2 => IslandDifficulty::Medium,
      _ => IslandDifficulty::Easy,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IslandProgress {
  pub unlocked: BTreeSet<u8>,
  pub next_islands_difficulty: Option<IslandDifficulty>,
}

impl Default for IslandProgress {
  fn default() -> Self {
    Self { unlocked: BTreeSet::from([1]), next_islands_difficulty: None }
  }
}

pub fn is_known(island: u8) -> bool {
  (1..=ISLAND_COUNT).contains(&island)
}

pub fn is_hard_tier(island: u8) -> bool {
  island >= HARD_TIER_FROM
}

impl IslandProgress {
  pub fn is_unlocked(&self, island: u8) -> bool {
    island == 1 || self.unlocked.contains(&island)
  }

  pub fn record_finish(&mut self, island: u8, mistakes: u32) {
    match island {
      1 | 2 => {
        self.unlocked.insert(island + 1);
      }
      3 => self.unlocked.extend(HARD_TIER_FROM..=ISLAND_COUNT),
      _ => {}
    }
    self.next_islands_difficulty = Some(IslandDifficulty::from_mistakes(mistakes));
  }
}
