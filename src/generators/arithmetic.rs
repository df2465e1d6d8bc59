//! Number-driven kinds: addition, subtraction, multiplication, comparison, sequence.
//!
//! Operand ranges scale with the modifier; the widest ranges need `harder` on a
//! hard-mode island.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{build_task, distractor_offsets, numeric_options, Difficulty};
use crate::domain::{Answer, Modifier, Side, Task, TaskDetail};

pub(super) fn addition<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let (lo, hi) = if d.modifier == Modifier::Easier {
    (1, 10)
  } else if d.hard_tier() {
    (30, 80)
  } else {
    (1, 30)
  };
  let a: u32 = rng.gen_range(lo..=hi);
  let b: u32 = rng.gen_range(lo..=hi);
  let sum = a + b;

  let candidates = distractor_offsets(d.modifier).iter().map(|o| sum as i64 + o).collect();
  let options = numeric_options(sum, candidates, 1, d.modifier, rng);
  build_task(
    d,
    format!("How many is {a} + {b}?"),
    Answer::Number(sum),
    options,
    TaskDetail::Addition { a, b },
  )
}

pub(super) fn subtraction<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  // Minuend always strictly above the subtrahend.
  let (subtrahend, minuend) = if d.modifier == Modifier::Easier {
    let b: u32 = rng.gen_range(1..=8);
    (b, rng.gen_range(b + 1..=b + 10))
  } else if d.hard_tier() {
    let b: u32 = rng.gen_range(20..=60);
    (b, rng.gen_range(b + 1..=b + 30))
  } else {
    let b: u32 = rng.gen_range(1..=20);
    (b, rng.gen_range(b + 1..=b + 20))
  };
  let result = minuend - subtrahend;

  let mut candidates: Vec<i64> = distractor_offsets(d.modifier).iter().map(|o| result as i64 + o).collect();
  // Typical slips: reading off an operand, or adding instead.
  match d.modifier {
    Modifier::Harder => candidates.push((minuend + subtrahend) as i64),
    _ => candidates.extend([minuend as i64, subtrahend as i64]),
  }
  let options = numeric_options(result, candidates, 0, d.modifier, rng);
  build_task(
    d,
    format!("How many is {minuend} - {subtrahend}?"),
    Answer::Number(result),
    options,
    TaskDetail::Subtraction { minuend, subtrahend },
  )
}

pub(super) fn multiplication<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let (lo, hi) = if d.modifier == Modifier::Easier {
    (2, 5)
  } else if d.hard_tier() {
    (5, 10)
  } else {
    (2, 6)
  };
  let a: u32 = rng.gen_range(lo..=hi);
  let b: u32 = rng.gen_range(lo..=hi);
  let product = a * b;

  let (ai, bi, p) = (a as i64, b as i64, product as i64);
  let candidates = match d.modifier {
    Modifier::Easier => vec![ai, bi, ai + bi, ai * (bi - 1), (ai - 1) * bi, p + ai, p - ai],
    Modifier::Neutral => vec![p + 2, p - 2, ai + bi, ai * (bi - 1), (ai - 1) * bi, p + ai],
    Modifier::Harder => vec![p + ai, p + bi, p - ai, p - bi, ai + bi, ai * (bi + 1), (ai + 1) * bi],
  };
  let options = numeric_options(product, candidates, 1, d.modifier, rng);
  build_task(
    d,
    format!("How many is {a} × {b}?"),
    Answer::Number(product),
    options,
    TaskDetail::Multiplication { a, b },
  )
}

pub(super) fn comparison<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let (mut left, mut right) = if d.modifier == Modifier::Easier {
    // Obvious: gap of at least 4.
    let base: u32 = rng.gen_range(2..=10);
    (base, base + rng.gen_range(4..=10))
  } else if d.hard_tier() {
    // Subtle: large counts, gap of 1 or 2.
    let base: u32 = rng.gen_range(30..=70);
    (base, base + rng.gen_range(1..=2))
  } else {
    let left: u32 = rng.gen_range(2..=25);
    let gap: u32 = rng.gen_range(2..=8);
    let right = if rng.gen_bool(0.5) { left + gap } else { left.saturating_sub(gap).max(1) };
    (left, right)
  };
  if left == right {
    right = left + rng.gen_range(1..=5);
  }
  if rng.gen_bool(0.5) {
    std::mem::swap(&mut left, &mut right);
  }

  let correct = if left > right { Side::Left } else { Side::Right };
  let mut options = vec![Answer::Side(Side::Left), Answer::Side(Side::Right)];
  options.shuffle(rng);
  build_task(
    d,
    "Which side has MORE items?".to_string(),
    Answer::Side(correct),
    options,
    TaskDetail::Comparison { left, right },
  )
}

pub(super) fn sequence<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let (shown, next, step) = match d.modifier {
    Modifier::Easier => {
      let start: u32 = rng.gen_range(1..=10);
      let step: u32 = rng.gen_range(1..=3);
      linear(start, step)
    }
    Modifier::Neutral => {
      let start: u32 = rng.gen_range(1..=10);
      let step: u32 = rng.gen_range(1..=5);
      linear(start, step)
    }
    Modifier::Harder => {
      let start: u32 = rng.gen_range(2..=15);
      match rng.gen_range(0..=4) {
        0 => linear(start, 2),
        1 => linear(start, 3),
        2 => {
          // Growing step: +s, +(s+1), +(s+2).
          let s: u32 = rng.gen_range(2..=4);
          let shown = vec![start, start + s, start + 2 * s + 1];
          let next = start + 3 * s + 3;
          (shown, next, s + 2)
        }
        _ => linear(start, rng.gen_range(4..=7)),
      }
    }
  };

  let (n, s) = (next as i64, step as i64);
  let candidates = vec![n + 1, n - 1, n + s, n - s, n + 2 * s];
  let options = numeric_options(next, candidates, 1, d.modifier, rng);
  let prompt = format!("What comes next? {}, {}, {}, ?", shown[0], shown[1], shown[2]);
  build_task(d, prompt, Answer::Number(next), options, TaskDetail::Sequence { shown })
}

fn linear(start: u32, step: u32) -> (Vec<u32>, u32, u32) {
  (vec![start, start + step, start + 2 * step], start + 3 * step, step)
}

#[cfg(test)]
mod tests {
  use super::super::tests::rng;
  use super::*;
  use crate::domain::Level;

  fn ctx(modifier: Modifier, hard_mode: bool) -> Difficulty {
    Difficulty::new(Level::clamped(2), modifier, hard_mode)
  }

  #[test]
  fn addition_ranges_follow_the_modifier() {
    for seed in 0..200 {
      if let TaskDetail::Addition { a, b } = addition(ctx(Modifier::Easier, true), &mut rng(seed)).detail {
        assert!((1..=10).contains(&a) && (1..=10).contains(&b));
      }
      if let TaskDetail::Addition { a, b } = addition(ctx(Modifier::Harder, true), &mut rng(seed)).detail {
        assert!((30..=80).contains(&a) && (30..=80).contains(&b));
      }
      // `harder` off the hard islands stays in the medium range.
      if let TaskDetail::Addition { a, b } = addition(ctx(Modifier::Harder, false), &mut rng(seed)).detail {
        assert!((1..=30).contains(&a) && (1..=30).contains(&b));
      }
    }
  }

  #[test]
  fn comparison_gap_tracks_difficulty() {
    for seed in 0..200 {
      if let TaskDetail::Comparison { left, right } = comparison(ctx(Modifier::Easier, false), &mut rng(seed)).detail {
        assert!(left.abs_diff(right) >= 4, "{left} vs {right}");
      }
      if let TaskDetail::Comparison { left, right } = comparison(ctx(Modifier::Harder, true), &mut rng(seed)).detail {
        let gap = left.abs_diff(right);
        assert!((1..=2).contains(&gap), "{left} vs {right}");
      }
    }
  }

  #[test]
  fn harder_subtraction_uses_large_operands() {
    for seed in 0..100 {
      let task = subtraction(ctx(Modifier::Harder, true), &mut rng(seed));
      if let TaskDetail::Subtraction { minuend, subtrahend } = task.detail {
        assert!((20..=60).contains(&subtrahend));
        assert!(minuend > subtrahend && minuend <= subtrahend + 30);
      }
    }
  }

  #[test]
  fn sequence_answer_continues_the_shown_terms() {
    for seed in 0..200 {
      let task = sequence(ctx(Modifier::Neutral, false), &mut rng(seed));
      if let TaskDetail::Sequence { shown } = &task.detail {
        let step = shown[1] - shown[0];
        assert_eq!(shown[2] - shown[1], step);
        assert_eq!(task.correct_answer, Answer::Number(shown[2] + step));
      }
    }
  }

  #[test]
  fn growing_step_sequence_is_consistent() {
    for seed in 0..300 {
      let task = sequence(ctx(Modifier::Harder, false), &mut rng(seed));
      if let (TaskDetail::Sequence { shown }, Answer::Number(next)) = (&task.detail, &task.correct_answer) {
        let d1 = shown[1] - shown[0];
        let d2 = shown[2] - shown[1];
        let d3 = next - shown[2];
        assert!(d2 == d1 || d2 == d1 + 1, "{shown:?} -> {next}");
        assert_eq!(d3 - d2, d2 - d1, "{shown:?} -> {next}");
      }
    }
  }

  #[test]
  fn multiplication_answer_is_the_product() {
    for seed in 0..100 {
      let task = multiplication(ctx(Modifier::Harder, true), &mut rng(seed));
      if let TaskDetail::Multiplication { a, b } = task.detail {
        assert!((5..=10).contains(&a) && (5..=10).contains(&b));
        assert_eq!(task.correct_answer, Answer::Number(a * b));
      }
    }
  }
}
