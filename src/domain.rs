//! Domain models used by the backend: difficulty axes, task kinds, answers, and the task itself.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 3;

/// Difficulty tier. Always within `MIN_LEVEL..=MAX_LEVEL`; out-of-range input is clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Level(u8);

impl Level {
  pub const EASIEST: Level = Level(MIN_LEVEL);
  pub const HARDEST: Level = Level(MAX_LEVEL);
  #[cfg(test)]
  pub const ALL: [Level; 3] = [Level(1), Level(2), Level(3)];

  pub fn clamped(raw: i64) -> Self {
    Level(raw.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8)
  }

  pub fn get(self) -> u8 { self.0 }

  /// One tier up, capped at `HARDEST`.
  pub fn up(self) -> Self { self.raised(1) }

  /// One tier down, floored at `EASIEST`.
  pub fn down(self) -> Self { Level::clamped(self.0 as i64 - 1) }

  pub fn raised(self, steps: u8) -> Self { Level::clamped(self.0 as i64 + steps as i64) }
}

impl Default for Level {
  fn default() -> Self { Level::EASIEST }
}

impl From<i64> for Level {
  fn from(raw: i64) -> Self { Level::clamped(raw) }
}

impl From<Level> for u8 {
  fn from(level: Level) -> Self { level.0 }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Second difficulty axis: scales numeric ranges and distractor spread within a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
  Easier,
  #[default]
  Neutral,
  Harder,
}

impl Modifier {
  #[cfg(test)]
  pub const ALL: [Modifier; 3] = [Modifier::Easier, Modifier::Neutral, Modifier::Harder];

  pub fn as_str(self) -> &'static str {
    match self {
      Modifier::Easier => "easier",
      Modifier::Neutral => "neutral",
      Modifier::Harder => "harder",
    }
  }
}

impl fmt::Display for Modifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Which kind pool a session draws from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
  /// Weighted arithmetic mix.
  #[default]
  Standard,
  /// Structured visual tasks with small numbers (always `easier` ranges).
  Gentle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
  Addition,
  Subtraction,
  Multiplication,
  Comparison,
  Sequence,
  OddOneOut,
  Counting,
  Matching,
  ColorSort,
  Category,
  Pattern,
  SizeComparison,
}

impl TaskKind {
  #[cfg(test)]
  pub const ALL: [TaskKind; 12] = [
    TaskKind::Addition,
    TaskKind::Subtraction,
    TaskKind::Multiplication,
    TaskKind::Comparison,
    TaskKind::Sequence,
    TaskKind::OddOneOut,
    TaskKind::Counting,
    TaskKind::Matching,
    TaskKind::ColorSort,
    TaskKind::Category,
    TaskKind::Pattern,
    TaskKind::SizeComparison,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      TaskKind::Addition => "addition",
      TaskKind::Subtraction => "subtraction",
      TaskKind::Multiplication => "multiplication",
      TaskKind::Comparison => "comparison",
      TaskKind::Sequence => "sequence",
      TaskKind::OddOneOut => "odd-one-out",
      TaskKind::Counting => "counting",
      TaskKind::Matching => "matching",
      TaskKind::ColorSort => "color-sort",
      TaskKind::Category => "category",
      TaskKind::Pattern => "pattern",
      TaskKind::SizeComparison => "size-comparison",
    }
  }

  /// Binary-choice kinds carry 2 options, everything else 4.
  pub fn option_count(self) -> usize {
    match self {
      TaskKind::Comparison => 2,
      _ => 4,
    }
  }
}

impl fmt::Display for TaskKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
  Left,
  Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
  Big,
  Small,
}

/// A candidate or correct answer. Untagged on the wire: `7`, `"left"`, `"🔴"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
  Number(u32),
  Side(Side),
  Token(String),
}

impl From<u32> for Answer {
  fn from(n: u32) -> Self { Answer::Number(n) }
}

impl From<Side> for Answer {
  fn from(side: Side) -> Self { Answer::Side(side) }
}

impl From<&str> for Answer {
  fn from(token: &str) -> Self { Answer::Token(token.to_string()) }
}

impl fmt::Display for Answer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Answer::Number(n) => write!(f, "{n}"),
      Answer::Side(Side::Left) => f.write_str("left"),
      Answer::Side(Side::Right) => f.write_str("right"),
      Answer::Token(t) => f.write_str(t),
    }
  }
}

/// Kind-specific payload needed only for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum TaskDetail {
  Addition { a: u32, b: u32 },
  Subtraction { minuend: u32, subtrahend: u32 },
  Multiplication { a: u32, b: u32 },
  Comparison { left: u32, right: u32 },
  Sequence { shown: Vec<u32> },
  OddOneOut { items: Vec<String> },
  Counting { count: u32, visual: String },
  Matching { target: String },
  ColorSort { items: Vec<String>, majority_color: String },
  Category { name: String, members: Vec<String> },
  Pattern { items: Vec<String> },
  SizeComparison { big_item: String, small_item: String, wanted: Size },
}

impl TaskDetail {
  pub fn kind(&self) -> TaskKind {
    match self {
      TaskDetail::Addition { .. } => TaskKind::Addition,
      TaskDetail::Subtraction { .. } => TaskKind::Subtraction,
      TaskDetail::Multiplication { .. } => TaskKind::Multiplication,
      TaskDetail::Comparison { .. } => TaskKind::Comparison,
      TaskDetail::Sequence { .. } => TaskKind::Sequence,
      TaskDetail::OddOneOut { .. } => TaskKind::OddOneOut,
      TaskDetail::Counting { .. } => TaskKind::Counting,
      TaskDetail::Matching { .. } => TaskKind::Matching,
      TaskDetail::ColorSort { .. } => TaskKind::ColorSort,
      TaskDetail::Category { .. } => TaskKind::Category,
      TaskDetail::Pattern { .. } => TaskKind::Pattern,
      TaskDetail::SizeComparison { .. } => TaskKind::SizeComparison,
    }
  }
}

/// A single exercise instance as handed to the rendering surface.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub prompt: String,
  pub correct_answer: Answer,
  /// Shuffled once at generation; stable for a single render.
  pub options: Vec<Answer>,
  pub level: Level,
  pub modifier: Modifier,
  #[serde(flatten)]
  pub detail: TaskDetail,
}

impl Task {
  pub fn kind(&self) -> TaskKind { self.detail.kind() }

  pub fn is_correct(&self, answer: &Answer) -> bool { *answer == self.correct_answer }
}
