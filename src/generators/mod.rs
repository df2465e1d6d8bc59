//! Randomized task generation.
//!
//! Every generator is a pure function of its difficulty context and an injected
//! random source (`R: Rng`), so seeded sources give reproducible tasks.
//!
//! Option lists follow one policy everywhere: take the candidate distractors,
//! clamp them, de-duplicate against the correct answer, then pad with synthesized
//! alternatives until the kind's option count is reached, and shuffle.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{Answer, Level, Modifier, Task, TaskDetail, TaskKind, Track};

mod arithmetic;
mod visual;

/// Tasks per session.
pub const SESSION_SIZE: usize = 3;

/// Difficulty context handed to each kind generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Difficulty {
  pub level: Level,
  pub modifier: Modifier,
  /// Island-tier flag (islands 4-6): unlocks the widest ranges together with `harder`.
  pub hard_mode: bool,
}

impl Difficulty {
  pub fn new(level: Level, modifier: Modifier, hard_mode: bool) -> Self {
    Self { level, modifier, hard_mode }
  }

  pub(crate) fn hard_tier(&self) -> bool {
    self.modifier == Modifier::Harder && self.hard_mode
  }
}

const STANDARD_LEVEL1: &[(TaskKind, u32)] = &[(TaskKind::Addition, 70), (TaskKind::Subtraction, 30)];

const STANDARD_LEVEL2: &[(TaskKind, u32)] = &[
  (TaskKind::Addition, 30),
  (TaskKind::Subtraction, 20),
  (TaskKind::Comparison, 25),
  (TaskKind::Sequence, 25),
];

const STANDARD_LEVEL3: &[(TaskKind, u32)] = &[
  (TaskKind::Addition, 25),
  (TaskKind::Subtraction, 15),
  (TaskKind::Multiplication, 15),
  (TaskKind::Comparison, 15),
  (TaskKind::Sequence, 15),
  (TaskKind::OddOneOut, 15),
];

const GENTLE_LEVEL1: &[TaskKind] = &[
  TaskKind::Addition,
  TaskKind::Counting,
  TaskKind::Matching,
  TaskKind::ColorSort,
  TaskKind::Comparison,
];

const GENTLE_LEVEL2: &[TaskKind] = &[
  TaskKind::Addition,
  TaskKind::Subtraction,
  TaskKind::Comparison,
  TaskKind::OddOneOut,
  TaskKind::ColorSort,
  TaskKind::Matching,
  TaskKind::Counting,
  TaskKind::SizeComparison,
];

const GENTLE_LEVEL3: &[TaskKind] = &[
  TaskKind::Addition,
  TaskKind::Subtraction,
  TaskKind::Comparison,
  TaskKind::OddOneOut,
  TaskKind::ColorSort,
  TaskKind::Matching,
  TaskKind::Counting,
  TaskKind::Pattern,
  TaskKind::SizeComparison,
  TaskKind::Category,
  TaskKind::Sequence,
];

/// Kinds a track may draw at a level.
#[cfg(test)]
pub fn eligible_kinds(level: Level, track: Track) -> Vec<TaskKind> {
  match track {
    Track::Standard => standard_weights(level).iter().map(|(k, _)| *k).collect(),
    Track::Gentle => gentle_kinds(level).to_vec(),
  }
}

fn standard_weights(level: Level) -> &'static [(TaskKind, u32)] {
  match level.get() {
    1 => STANDARD_LEVEL1,
    2 => STANDARD_LEVEL2,
    _ => STANDARD_LEVEL3,
  }
}

fn gentle_kinds(level: Level) -> &'static [TaskKind] {
  match level.get() {
    1 => GENTLE_LEVEL1,
    2 => GENTLE_LEVEL2,
    _ => GENTLE_LEVEL3,
  }
}

/// Draw a kind for `level`. Stochastic: callers may only rely on the result being eligible.
pub fn choose_kind<R: Rng + ?Sized>(level: Level, track: Track, rng: &mut R) -> TaskKind {
  match track {
    Track::Standard => standard_weights(level)
      .choose_weighted(rng, |(_, w)| *w)
      .map(|(k, _)| *k)
      .unwrap_or(TaskKind::Addition),
    Track::Gentle => gentle_kinds(level)
      .choose(rng)
      .copied()
      .unwrap_or(TaskKind::Addition),
  }
}

/// Generate one task of an explicit kind.
pub fn generate<R: Rng + ?Sized>(
  kind: TaskKind,
  level: Level,
  modifier: Modifier,
  hard_mode: bool,
  rng: &mut R,
) -> Task {
  let d = Difficulty::new(level, modifier, hard_mode);
  match kind {
    TaskKind::Addition => arithmetic::addition(d, rng),
    TaskKind::Subtraction => arithmetic::subtraction(d, rng),
    TaskKind::Multiplication => arithmetic::multiplication(d, rng),
    TaskKind::Comparison => arithmetic::comparison(d, rng),
    TaskKind::Sequence => arithmetic::sequence(d, rng),
    TaskKind::OddOneOut => visual::odd_one_out(d, rng),
    TaskKind::Counting => visual::counting(d, rng),
    TaskKind::Matching => visual::matching(d, rng),
    TaskKind::ColorSort => visual::color_sort(d, rng),
    TaskKind::Category => visual::category(d, rng),
    TaskKind::Pattern => visual::pattern(d, rng),
    TaskKind::SizeComparison => visual::size_comparison(d, rng),
  }
}

/// Generate one task whose kind is drawn by the track's selection policy.
pub fn random_task<R: Rng + ?Sized>(
  level: Level,
  modifier: Modifier,
  hard_mode: bool,
  track: Track,
  rng: &mut R,
) -> Task {
  let kind = choose_kind(level, track, rng);
  let modifier = match track {
    Track::Standard => modifier,
    Track::Gentle => Modifier::Easier,
  };
  generate(kind, level, modifier, hard_mode, rng)
}

/// Per-position levels of a session: `L`, `L+1`, then the top tier.
/// `harder` in hard mode lifts the first two positions one more step. Never decreasing.
pub fn session_levels(level: Level, modifier: Modifier, hard_mode: bool) -> [Level; SESSION_SIZE] {
  let boost = u8::from(hard_mode && modifier == Modifier::Harder);
  [level.raised(boost), level.up().raised(boost), Level::HARDEST]
}

fn session_on<R: Rng + ?Sized>(
  track: Track,
  level: Level,
  modifier: Modifier,
  hard_mode: bool,
  rng: &mut R,
) -> Vec<Task> {
  session_levels(level, modifier, hard_mode)
    .into_iter()
    .map(|l| random_task(l, modifier, hard_mode, track, rng))
    .collect()
}

/// Three standard-track tasks with non-decreasing difficulty.
pub fn generate_session<R: Rng + ?Sized>(
  level: Level,
  modifier: Modifier,
  hard_mode: bool,
  rng: &mut R,
) -> Vec<Task> {
  session_on(Track::Standard, level, modifier, hard_mode, rng)
}

pub fn generate_track_session<R: Rng + ?Sized>(
  track: Track,
  level: Level,
  modifier: Modifier,
  hard_mode: bool,
  rng: &mut R,
) -> Vec<Task> {
  match track {
    Track::Standard => generate_session(level, modifier, hard_mode, rng),
    Track::Gentle => session_on(Track::Gentle, level, modifier, hard_mode, rng),
  }
}

// -------- Option helpers --------

/// Distractor offsets around the correct value.
pub(crate) fn distractor_offsets(modifier: Modifier) -> &'static [i64] {
  match modifier {
    Modifier::Easier => &[1, 2, -1, -2],
    Modifier::Neutral => &[2, 3, 4, 5, -2, -3, -4, -5],
    Modifier::Harder => &[2, 3, 5, 7, 10, -2, -3, -5, -7, -10],
  }
}

fn pad_spread(modifier: Modifier) -> i64 {
  match modifier {
    Modifier::Easier => 3,
    Modifier::Neutral => 5,
    Modifier::Harder => 10,
  }
}

fn clamp_floor(value: i64, floor: u32) -> u32 {
  value.clamp(floor as i64, u32::MAX as i64) as u32
}

/// Build 4 numeric options: 3 candidates drawn from `candidates`, clamped to `floor`,
/// de-duplicated, then padded.
pub(crate) fn numeric_options<R: Rng + ?Sized>(
  correct: u32,
  mut candidates: Vec<i64>,
  floor: u32,
  modifier: Modifier,
  rng: &mut R,
) -> Vec<Answer> {
  let target = 4;
  candidates.shuffle(rng);

  let mut values = vec![correct];
  for c in candidates.into_iter().take(target - 1) {
    let v = clamp_floor(c, floor);
    if !values.contains(&v) {
      values.push(v);
    }
  }

  let spread = pad_spread(modifier);
  for _ in 0..32 {
    if values.len() >= target {
      break;
    }
    let magnitude = rng.gen_range(1..=spread);
    let offset = if rng.gen_bool(0.5) { magnitude } else { -magnitude };
    let v = clamp_floor(correct as i64 + offset, floor);
    if !values.contains(&v) {
      values.push(v);
    }
  }
  // Deterministic tail: counting upward always yields fresh values.
  let mut next = correct.max(floor);
  while values.len() < target {
    next = next.saturating_add(1);
    if !values.contains(&next) {
      values.push(next);
    }
  }

  values.shuffle(rng);
  values.into_iter().map(Answer::Number).collect()
}

/// Neutral tokens used only when a kind's own distractor pool runs short.
const FALLBACK_TOKENS: &[&str] = &["🐱", "🐶", "🍎", "🚗", "🏠", "📚", "⭐", "🔵"];

/// Build 4 token options: `correct` plus up to 3 distinct entries of `pool`.
pub(crate) fn token_options<R: Rng + ?Sized>(correct: &str, pool: &[&str], rng: &mut R) -> Vec<Answer> {
  let target = 4;
  let mut values: Vec<&str> = vec![correct];
  for t in pool.iter().chain(FALLBACK_TOKENS.iter()) {
    if values.len() >= target {
      break;
    }
    if !values.contains(t) {
      values.push(*t);
    }
  }
  values.shuffle(rng);
  values.into_iter().map(Answer::from).collect()
}

pub(crate) fn build_task(d: Difficulty, prompt: String, correct: Answer, options: Vec<Answer>, detail: TaskDetail) -> Task {
  debug_assert_eq!(options.len(), detail.kind().option_count());
  Task {
    prompt,
    correct_answer: correct,
    options,
    level: d.level,
    modifier: d.modifier,
    detail,
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::domain::{Side, TaskDetail};
  use rand::SeedableRng;
  use rand_chacha::ChaCha8Rng;

  pub(crate) fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
  }

  /// Every (kind, level, modifier, hard mode) over a spread of seeds.
  pub(crate) fn sweep(mut check: impl FnMut(&Task)) {
    for kind in TaskKind::ALL {
      for level in Level::ALL {
        for modifier in Modifier::ALL {
          for hard_mode in [false, true] {
            for seed in 0..40 {
              let task = generate(kind, level, modifier, hard_mode, &mut rng(seed));
              assert_eq!(task.kind(), kind);
              check(&task);
            }
          }
        }
      }
    }
  }

  #[test]
  fn options_hold_the_answer_exactly_once_and_are_distinct() {
    sweep(|task| {
      let hits = task.options.iter().filter(|o| **o == task.correct_answer).count();
      assert_eq!(hits, 1, "{task:?}");
      assert_eq!(task.options.len(), task.kind().option_count(), "{task:?}");
      for (i, a) in task.options.iter().enumerate() {
        for b in &task.options[i + 1..] {
          assert_ne!(a, b, "duplicate option in {task:?}");
        }
      }
    });
  }

  #[test]
  fn subtraction_never_goes_negative() {
    sweep(|task| {
      if let TaskDetail::Subtraction { minuend, subtrahend } = task.detail {
        assert!(minuend > subtrahend);
        assert_eq!(task.correct_answer, Answer::Number(minuend - subtrahend));
      }
    });
  }

  #[test]
  fn comparison_answer_matches_the_larger_side() {
    sweep(|task| {
      if let TaskDetail::Comparison { left, right } = task.detail {
        assert_ne!(left, right);
        let expected = if left > right { Side::Left } else { Side::Right };
        assert_eq!(task.correct_answer, Answer::Side(expected));
      }
    });
  }

  #[test]
  fn numeric_options_respect_their_floor() {
    sweep(|task| {
      let floor = match task.kind() {
        TaskKind::Addition | TaskKind::Multiplication | TaskKind::Counting | TaskKind::Sequence => 1,
        _ => 0,
      };
      for o in &task.options {
        if let Answer::Number(n) = o {
          assert!(*n >= floor, "{task:?}");
        }
      }
    });
  }

  #[test]
  fn out_of_range_levels_are_clamped() {
    let task = generate(TaskKind::Counting, Level::clamped(42), Modifier::Neutral, false, &mut rng(1));
    assert_eq!(task.level, Level::HARDEST);
    let task = generate(TaskKind::Counting, Level::clamped(-3), Modifier::Neutral, false, &mut rng(1));
    assert_eq!(task.level, Level::EASIEST);
  }

  #[test]
  fn selection_stays_within_the_level_pool() {
    for track in [Track::Standard, Track::Gentle] {
      for level in Level::ALL {
        let pool = eligible_kinds(level, track);
        for seed in 0..200 {
          let kind = choose_kind(level, track, &mut rng(seed));
          assert!(pool.contains(&kind), "{kind} not eligible at level {level} on {track:?}");
        }
      }
    }
    assert_eq!(eligible_kinds(Level::EASIEST, Track::Standard), vec![TaskKind::Addition, TaskKind::Subtraction]);
  }

  #[test]
  fn level_three_reaches_the_whole_vocabulary() {
    let mut all = eligible_kinds(Level::HARDEST, Track::Standard);
    all.extend(eligible_kinds(Level::HARDEST, Track::Gentle));
    for kind in TaskKind::ALL {
      assert!(all.contains(&kind), "{kind} unreachable");
    }
  }

  #[test]
  fn easier_session_climbs_one_two_three() {
    let tasks = generate_session(Level::EASIEST, Modifier::Easier, false, &mut rng(7));
    let levels: Vec<u8> = tasks.iter().map(|t| t.level.get()).collect();
    assert_eq!(levels, vec![1, 2, 3]);
  }

  #[test]
  fn session_levels_never_decrease() {
    for level in Level::ALL {
      for modifier in Modifier::ALL {
        for hard_mode in [false, true] {
          let levels = session_levels(level, modifier, hard_mode);
          assert!(levels.windows(2).all(|w| w[0] <= w[1]), "{levels:?}");
          assert_eq!(levels[2], Level::HARDEST);
        }
      }
    }
    let boosted = session_levels(Level::EASIEST, Modifier::Harder, true);
    assert_eq!(boosted.map(Level::get), [2, 3, 3]);
  }

  #[test]
  fn gentle_sessions_use_easier_ranges() {
    for seed in 0..30 {
      let tasks = generate_track_session(Track::Gentle, Level::clamped(2), Modifier::Harder, true, &mut rng(seed));
      assert_eq!(tasks.len(), SESSION_SIZE);
      assert!(tasks.iter().all(|t| t.modifier == Modifier::Easier));
    }
  }

  #[test]
  fn standard_track_sessions_match_generate_session() {
    let a = generate_track_session(Track::Standard, Level::HARDEST, Modifier::Harder, true, &mut rng(5));
    let b = generate_session(Level::HARDEST, Modifier::Harder, true, &mut rng(5));
    assert_eq!(a, b);
  }

  #[test]
  fn seeded_generation_is_reproducible() {
    let a = generate_session(Level::clamped(2), Modifier::Neutral, false, &mut rng(99));
    let b = generate_session(Level::clamped(2), Modifier::Neutral, false, &mut rng(99));
    assert_eq!(a, b);
  }

  #[test]
  fn padding_fills_collapsed_candidates() {
    // All candidates clamp to the floor, which equals the answer.
    let opts = numeric_options(1, vec![-5, -4, -3], 1, Modifier::Easier, &mut rng(3));
    assert_eq!(opts.len(), 4);
    assert!(opts.contains(&Answer::Number(1)));
  }
}
