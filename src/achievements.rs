//! Achievement catalogue and evaluation. Unlocks are sticky.

use serde::Serialize;

use crate::profile::Profile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Achievement {
  pub id: &'static str,
  pub title: &'static str,
  pub description: &'static str,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
  Achievement { id: "first", title: "First Steps", description: "Complete your first task" },
  Achievement { id: "no_mistakes_3", title: "Flawless Trio", description: "Complete 3 tasks in a row with 0 mistakes" },
  Achievement { id: "level_up", title: "Level Up!", description: "Increase your level" },
  Achievement { id: "ten_tasks", title: "Math Explorer", description: "Complete 10 tasks" },
];

fn earned(id: &str, profile: &Profile) -> bool {
  match id {
    "first" => profile.tasks_completed >= 1,
    "no_mistakes_3" => profile.last_three_mistakes.full_and_all(|m| m == 0),
    "level_up" => match profile.level_history.as_slice() {
      [.., prev, last] => last > prev,
      _ => false,
    },
    "ten_tasks" => profile.tasks_completed >= 10,
    _ => false,
  }
}

/// Already unlocked ids (kept, in order) followed by newly earned ones in catalogue order.
pub fn evaluate(profile: &Profile) -> Vec<String> {
  let mut unlocked = profile.achievements.clone();
  for a in ACHIEVEMENTS {
    if !unlocked.iter().any(|u| u == a.id) && earned(a.id, profile) {
      unlocked.push(a.id.to_string());
    }
  }
  unlocked
}
