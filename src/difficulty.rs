//! Adaptive difficulty controller.
//!
//! Two independent axes are derived from each session's mistake count:
//!   - the level (1..=3) steps by one per session, with a stabilizing extra
//!     step when the last three sessions were uniformly strong or weak;
//!   - the modifier for the next session's numeric ranges.
//!
//! `apply_session_result` is pure: the same profile and mistake count always
//! produce the same result.

use serde::Serialize;

use crate::achievements;
use crate::domain::{Level, Modifier};
use crate::profile::Profile;

/// Mistakes at or above this count as a weak session.
pub const HIGH_MISTAKES: u32 = 3;
/// Mistakes at or below this count as a strong session.
pub const LOW_MISTAKES: u32 = 1;
const MAX_POINTS_PER_SESSION: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParameters {
  pub level: Level,
  pub modifier: Modifier,
}

pub fn next_session_parameters(profile: &Profile) -> SessionParameters {
  SessionParameters {
    level: profile.level,
    modifier: profile.next_difficulty_modifier,
  }
}

/// Modifier for the next session.
pub fn next_modifier(mistakes: u32) -> Modifier {
  if mistakes <= LOW_MISTAKES {
    Modifier::Harder
  } else if mistakes >= HIGH_MISTAKES {
    Modifier::Easier
  } else {
    Modifier::Neutral
  }
}

fn immediate_level(level: Level, mistakes: u32) -> Level {
  if mistakes >= HIGH_MISTAKES {
    level.down()
  } else if mistakes <= LOW_MISTAKES {
    level.up()
  } else {
    level
  }
}

/// Level after a session. `history` must already include this session's mistakes.
/// The stabilizing step stacks on top of the immediate one.
pub fn next_level(level: Level, mistakes: u32, history: &crate::profile::MistakeHistory) -> Level {
  let stepped = immediate_level(level, mistakes);
  if history.full_and_all(|m| m >= HIGH_MISTAKES) {
    stepped.down()
  } else if history.full_and_all(|m| m <= LOW_MISTAKES) {
    stepped.up()
  } else {
    stepped
  }
}

pub fn points_for(mistakes: u32) -> u32 {
  MAX_POINTS_PER_SESSION.saturating_sub(mistakes).max(1)
}

/// Fold one completed session into the profile.
pub fn apply_session_result(profile: &Profile, mistakes: u32) -> Profile {
  let mut next = profile.clone();

  next.tasks_completed = next.tasks_completed.saturating_add(1);
  next.total_mistakes = next.total_mistakes.saturating_add(mistakes);
  next.last_three_mistakes.push(mistakes);

  next.level = next_level(profile.level, mistakes, &next.last_three_mistakes);
  next.push_level(next.level);
  next.next_difficulty_modifier = next_modifier(mistakes);
  next.points = next.points.saturating_add(points_for(mistakes));
  next.achievements = achievements::evaluate(&next);
  next
}
