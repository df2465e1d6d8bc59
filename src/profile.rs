//! Learner profile: the durable record the difficulty controller reads and rewrites.
//!
//! Decoding is lenient. A record that is not JSON yields the default profile, and
//! inside a JSON object every field falls back to its own default, so partial
//! corruption never breaks the read path.

use std::collections::VecDeque;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::{Level, Modifier};

pub const HISTORY_CAPACITY: usize = 3;
/// Newest entries kept in `Profile::level_history`.
pub const LEVEL_HISTORY_CAPACITY: usize = 50;

/// Mistake counts of the most recent sessions, oldest first. FIFO, capacity 3.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MistakeHistory(VecDeque<u32>);

impl MistakeHistory {
  /// Keeps the last `HISTORY_CAPACITY` entries of `entries`.
  pub fn from_entries(entries: impl IntoIterator<Item = u32>) -> Self {
    let mut h = MistakeHistory::default();
    for m in entries {
      h.push(m);
    }
    h
  }

  pub fn push(&mut self, mistakes: u32) {
    if self.0.len() == HISTORY_CAPACITY {
      self.0.pop_front();
    }
    self.0.push_back(mistakes);
  }

  pub fn is_full(&self) -> bool { self.0.len() == HISTORY_CAPACITY }

  /// True only once the window is full and every entry satisfies `pred`.
  pub fn full_and_all(&self, pred: impl Fn(u32) -> bool) -> bool {
    self.is_full() && self.0.iter().all(|m| pred(*m))
  }

  #[cfg(test)]
  pub fn to_vec(&self) -> Vec<u32> { self.0.iter().copied().collect() }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub level: Level,
  pub tasks_completed: u32,
  pub total_mistakes: u32,
  pub last_three_mistakes: MistakeHistory,
  pub next_difficulty_modifier: Modifier,
  pub points: u32,
  /// Level after each recent session, oldest first. Capped at `LEVEL_HISTORY_CAPACITY`.
  pub level_history: Vec<Level>,
  /// Unlocked achievement ids, in unlock order.
  pub achievements: Vec<String>,
}

impl Default for Profile {
  fn default() -> Self {
    Self {
      level: Level::EASIEST,
      tasks_completed: 0,
      total_mistakes: 0,
      last_three_mistakes: MistakeHistory::default(),
      next_difficulty_modifier: Modifier::Neutral,
      points: 0,
      level_history: vec![Level::EASIEST],
      achievements: Vec::new(),
    }
  }
}

impl Profile {
  /// Append a level, dropping the oldest entries past the cap.
  pub fn push_level(&mut self, level: Level) {
    self.level_history.push(level);
    let len = self.level_history.len();
    if len > LEVEL_HISTORY_CAPACITY {
      self.level_history.drain(..len - LEVEL_HISTORY_CAPACITY);
    }
  }

  /// Decode a persisted record. Never fails.
  pub fn from_json(raw: &str) -> Self {
    match serde_json::from_str::<Value>(raw) {
      Ok(v) => Self::from_value(&v),
      Err(e) => {
        warn!(target: "talentia_backend", error = %e, "Unparsable profile record; using defaults");
        Profile::default()
      }
    }
  }

  pub fn from_value(v: &Value) -> Self {
    let defaults = Profile::default();
    let Some(obj) = v.as_object() else {
      warn!(target: "talentia_backend", "Profile record is not an object; using defaults");
      return defaults;
    };

    Self {
      level: obj.get("level").and_then(Value::as_i64).map(Level::clamped).unwrap_or(defaults.level),
      tasks_completed: counter(obj, "tasksCompleted"),
      total_mistakes: counter(obj, "totalMistakes"),
      last_three_mistakes: obj
        .get("lastThreeMistakes")
        .and_then(Value::as_array)
        .map(|xs| MistakeHistory::from_entries(xs.iter().filter_map(as_u32)))
        .unwrap_or_default(),
      next_difficulty_modifier: obj
        .get("nextDifficultyModifier")
        .and_then(|m| serde_json::from_value::<Modifier>(m.clone()).ok())
        .unwrap_or(defaults.next_difficulty_modifier),
      points: counter(obj, "points"),
      level_history: obj
        .get("levelHistory")
        .and_then(Value::as_array)
        .map(|xs| {
          let levels: Vec<Level> = xs.iter().filter_map(Value::as_i64).map(Level::clamped).collect();
          let skip = levels.len().saturating_sub(LEVEL_HISTORY_CAPACITY);
          levels[skip..].to_vec()
        })
        .unwrap_or(defaults.level_history),
      achievements: obj
        .get("achievements")
        .and_then(Value::as_array)
        .map(|xs| xs.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default(),
    }
  }
}

fn as_u32(v: &Value) -> Option<u32> {
  v.as_u64().map(|n| n.min(u32::MAX as u64) as u32)
}

fn counter(obj: &Map<String, Value>, key: &str) -> u32 {
  obj.get(key).and_then(as_u32).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn history_evicts_oldest_first() {
    let mut h = MistakeHistory::from_entries([4, 0, 2]);
    h.push(1);
    assert_eq!(h.to_vec(), vec![0, 2, 1]);
    assert!(h.full_and_all(|m| m <= 2));
    assert!(!MistakeHistory::from_entries([0, 0]).full_and_all(|m| m == 0));
  }

  #[test]
  fn garbage_decodes_to_default() {
    assert_eq!(Profile::from_json("{not json"), Profile::default());
    assert_eq!(Profile::from_json("[1,2,3]"), Profile::default());
    assert_eq!(Profile::from_json(""), Profile::default());
  }

  #[test]
  fn fields_default_independently() {
    let v = json!({
      "level": "three",
      "tasksCompleted": 7,
      "totalMistakes": -2,
      "lastThreeMistakes": [1, "x", 0, 5, 2],
      "nextDifficultyModifier": "harder",
      "points": 31,
      "achievements": ["first", 3]
    });
    let p = Profile::from_value(&v);
    assert_eq!(p.level, Level::EASIEST);
    assert_eq!(p.tasks_completed, 7);
    assert_eq!(p.total_mistakes, 0);
    assert_eq!(p.last_three_mistakes.to_vec(), vec![0, 5, 2]);
    assert_eq!(p.next_difficulty_modifier, Modifier::Harder);
    assert_eq!(p.points, 31);
    assert_eq!(p.level_history, vec![Level::EASIEST]);
    assert_eq!(p.achievements, vec!["first".to_string()]);
  }

  #[test]
  fn oversized_level_history_keeps_the_newest_entries() {
    let levels: Vec<i64> = (0..80).map(|i| 1 + i % 3).collect();
    let p = Profile::from_value(&json!({ "levelHistory": levels }));
    assert_eq!(p.level_history.len(), LEVEL_HISTORY_CAPACITY);
    assert_eq!(p.level_history.last().map(|l| l.get()), Some(1 + 79 % 3));
  }

  #[test]
  fn out_of_range_level_is_clamped() {
    assert_eq!(Profile::from_value(&json!({ "level": 9 })).level, Level::HARDEST);
    assert_eq!(Profile::from_value(&json!({ "level": 0 })).level, Level::EASIEST);
  }

  #[test]
  fn encodes_camel_case_and_decodes_back() {
    let p = Profile {
      level: Level::clamped(2),
      tasks_completed: 4,
      total_mistakes: 6,
      last_three_mistakes: MistakeHistory::from_entries([2, 1]),
      next_difficulty_modifier: Modifier::Easier,
      points: 14,
      level_history: vec![Level::EASIEST, Level::clamped(2)],
      achievements: vec!["first".into()],
    };
    let raw = serde_json::to_string(&p).expect("json");
    assert!(raw.contains("\"lastThreeMistakes\":[2,1]"));
    assert!(raw.contains("\"nextDifficultyModifier\":\"easier\""));
    assert_eq!(Profile::from_json(&raw), p);
  }
}
