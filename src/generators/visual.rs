//! Picture-driven kinds: odd-one-out, counting, matching, color-sort, category,
//! pattern, size-comparison. These scale with the level rather than the modifier.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{build_task, numeric_options, token_options, Difficulty};
use crate::domain::{Answer, Modifier, Size, Task, TaskDetail};

const SHAPES: &[&str] = &["🔺", "🟦", "🟢", "🟨", "🔴", "🟣", "⭐", "💎", "🔷", "🔶", "🟧", "🟩"];
const VISUALS: &[&str] = &["🔵", "🟢", "🔴", "🟡", "🟣", "🟠"];
const ANIMALS: &[&str] = &["🐱", "🐶", "🐰", "🐻", "🦁"];
const COLORS: &[(&str, &str)] = &[("red", "🔴"), ("blue", "🔵"), ("green", "🟢"), ("yellow", "🟡")];
const BIG_ITEMS: &[&str] = &["🐘", "🦏", "🦒", "🐋"];
const SMALL_ITEMS: &[&str] = &["🐭", "🐤", "🐛", "🐜"];
const PATTERN_POOL: &[&str] = &["🔴", "🔵", "🟢", "🟡", "🔺", "🟦"];

struct CategoryDef {
  name: &'static str,
  items: [&'static str; 4],
  distractors: [&'static str; 4],
}

const CATEGORIES: &[CategoryDef] = &[
  CategoryDef { name: "animals", items: ["🐱", "🐶", "🐰", "🐻"], distractors: ["🍎", "🚗", "🏠", "📚"] },
  CategoryDef { name: "fruits", items: ["🍎", "🍌", "🍊", "🍇"], distractors: ["🚗", "🏠", "📚", "🔴"] },
  CategoryDef { name: "vehicles", items: ["🚗", "🚌", "🚲", "✈️"], distractors: ["🍎", "🏠", "📚", "🐱"] },
];

const PATTERNS: &[(&[&str], &str)] = &[
  (&["🔴", "🔵", "🔴", "🔵"], "🔴"),
  (&["🟢", "🟢", "🟡", "🟢", "🟢"], "🟡"),
  (&["🔺", "🟦", "🔺", "🟦"], "🔺"),
  (&["⭐", "⭐", "💫", "⭐", "⭐"], "💫"),
];

fn pick<'a, R: Rng + ?Sized>(pool: &[&'a str], rng: &mut R) -> &'a str {
  pool.choose(rng).copied().unwrap_or(pool[0])
}

/// `pool` minus `exclude`, shuffled.
fn others<'a, R: Rng + ?Sized>(pool: &[&'a str], exclude: &[&str], rng: &mut R) -> Vec<&'a str> {
  let mut out: Vec<&'a str> = pool.iter().copied().filter(|p| !exclude.contains(p)).collect();
  out.shuffle(rng);
  out
}

pub(super) fn odd_one_out<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  // Level 1 keeps to the first, most distinct half of the palette.
  let palette = if d.level.get() == 1 { &SHAPES[..6] } else { SHAPES };
  let normal = pick(palette, rng);
  let odd = pick(&others(palette, &[normal], rng), rng);

  let same: usize = match d.modifier {
    Modifier::Easier => rng.gen_range(3..=5),
    Modifier::Neutral => rng.gen_range(5..=7),
    Modifier::Harder => rng.gen_range(6..=9),
  };
  let mut items: Vec<String> = std::iter::repeat(normal.to_string()).take(same).collect();
  items.push(odd.to_string());
  items.shuffle(rng);

  let mut pool = vec![normal];
  pool.extend(others(palette, &[normal, odd], rng));
  let options = token_options(odd, &pool, rng);
  build_task(
    d,
    "Find the DIFFERENT shape:".to_string(),
    Answer::from(odd),
    options,
    TaskDetail::OddOneOut { items },
  )
}

pub(super) fn counting<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let max: u32 = match d.level.get() {
    1 => 3,
    2 => 5,
    _ => 7,
  };
  let count = rng.gen_range(1..=max);
  let visual = pick(VISUALS, rng).to_string();

  let c = count as i64;
  let options = numeric_options(count, vec![c + 1, c - 1, c + 2], 1, d.modifier, rng);
  build_task(
    d,
    "How many do you see?".to_string(),
    Answer::Number(count),
    options,
    TaskDetail::Counting { count, visual },
  )
}

pub(super) fn matching<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let target = pick(ANIMALS, rng);
  let pool = others(ANIMALS, &[target], rng);
  let options = token_options(target, &pool, rng);
  build_task(
    d,
    "Find the SAME as this:".to_string(),
    Answer::from(target),
    options,
    TaskDetail::Matching { target: target.to_string() },
  )
}

pub(super) fn color_sort<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let (majority_name, majority) = COLORS.choose(rng).copied().unwrap_or(COLORS[0]);
  let emojis: Vec<&str> = COLORS.iter().map(|(_, e)| *e).collect();
  let odd = pick(&others(&emojis, &[majority], rng), rng);

  let same = 2 + d.level.get() as usize;
  let mut items: Vec<String> = std::iter::repeat(majority.to_string()).take(same).collect();
  items.push(odd.to_string());
  items.shuffle(rng);

  let pool = others(&emojis, &[odd], rng);
  let options = token_options(odd, &pool, rng);
  build_task(
    d,
    "Find the DIFFERENT color:".to_string(),
    Answer::from(odd),
    options,
    TaskDetail::ColorSort { items, majority_color: majority_name.to_string() },
  )
}

pub(super) fn category<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let def = CATEGORIES.choose(rng).unwrap_or(&CATEGORIES[0]);
  let target = pick(&def.items, rng);
  let members: Vec<String> = def.items.iter().filter(|i| **i != target).map(|i| i.to_string()).collect();

  let pool = others(&def.distractors, &[target], rng);
  let options = token_options(target, &pool, rng);
  build_task(
    d,
    "Which one belongs with these?".to_string(),
    Answer::from(target),
    options,
    TaskDetail::Category { name: def.name.to_string(), members },
  )
}

pub(super) fn pattern<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let (shown, next) = PATTERNS.choose(rng).copied().unwrap_or(PATTERNS[0]);
  let mut items: Vec<String> = shown.iter().map(|s| s.to_string()).collect();
  items.push("?".to_string());

  let pool = others(PATTERN_POOL, &[next], rng);
  let options = token_options(next, &pool, rng);
  build_task(
    d,
    "What comes next?".to_string(),
    Answer::from(next),
    options,
    TaskDetail::Pattern { items },
  )
}

pub(super) fn size_comparison<R: Rng + ?Sized>(d: Difficulty, rng: &mut R) -> Task {
  let wanted = if rng.gen_bool(0.5) { Size::Big } else { Size::Small };
  let big = pick(BIG_ITEMS, rng);
  let small = pick(SMALL_ITEMS, rng);
  let (correct, other, word) = match wanted {
    Size::Big => (big, small, "big"),
    Size::Small => (small, big, "small"),
  };

  let options = token_options(correct, &[other, "🐱", "🐶"], rng);
  build_task(
    d,
    format!("Which one is {word}?"),
    Answer::from(correct),
    options,
    TaskDetail::SizeComparison { big_item: big.to_string(), small_item: small.to_string(), wanted },
  )
}
