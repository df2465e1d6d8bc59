//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting a session (difficulty parameters + 3 generated tasks)
//!   - Grading answers task by task and counting mistakes
//!   - Completing a session exactly once (profile, analytics, island progress)
//!   - Read/reset helpers for profile, analytics and progress

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::analytics::{Analytics, ErrorRecord, SessionRecord};
use crate::difficulty::{apply_session_result, next_session_parameters};
use crate::domain::{Answer, Level, Modifier, Task, TaskKind, Track};
use crate::generators::{generate, generate_track_session, random_task};
use crate::profile::Profile;
use crate::progress::{self, IslandProgress};
use crate::state::{AppState, Session};
use crate::store::{load_json, load_profile, save_json, KeyValueStore, ANALYTICS_KEY, PROFILE_KEY, PROGRESS_KEY};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  #[error("Unknown sessionId: {0}")]
  UnknownSession(String),

  #[error("Task {got} is not the current task (expected {expected})")]
  OutOfOrder { expected: usize, got: usize },

  #[error("Unknown island: {0}")]
  UnknownIsland(u8),

  #[error("Island {0} is locked")]
  IslandLocked(u8),
}

#[derive(Clone, Debug)]
pub struct AnswerOutcome {
  pub correct: bool,
  pub mistakes: u32,
  /// Task awaiting an answer next; `None` once the session is complete.
  pub next_task: Option<usize>,
  pub completed: bool,
  pub profile: Option<Profile>,
}

/// Save a record, logging instead of failing: the computed state is still returned to the caller.
fn persist<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
  if let Err(e) = save_json(store, key, value) {
    error!(target: "session", %key, error = %e, "Failed to persist record");
  }
}

#[instrument(level = "info", skip(state))]
pub async fn start_session(state: &AppState, island: Option<u8>, track: Track) -> Result<Session, SessionError> {
  if let Some(i) = island {
    if !progress::is_known(i) {
      return Err(SessionError::UnknownIsland(i));
    }
    let map: IslandProgress = load_json(state.store.as_ref(), PROGRESS_KEY);
    if !map.is_unlocked(i) {
      warn!(target: "session", island = i, "Refusing session on locked island");
      return Err(SessionError::IslandLocked(i));
    }
  }

  let profile = load_profile(state.store.as_ref());
  let params = next_session_parameters(&profile);
  let hard_mode = island.map(progress::is_hard_tier).unwrap_or(false);
  let tasks = generate_track_session(track, params.level, params.modifier, hard_mode, &mut rand::thread_rng());

  let session = Session {
    id: Uuid::new_v4().to_string(),
    island,
    track,
    params,
    hard_mode,
    tasks,
    step: 0,
    mistakes: 0,
    created_at: Utc::now(),
  };
  state.insert_session(session.clone()).await;

  let kinds: Vec<TaskKind> = session.tasks.iter().map(Task::kind).collect();
  info!(target: "session", id = %session.id, level = %params.level, modifier = %params.modifier, hard_mode, ?kinds, "Session started");
  Ok(session)
}

#[instrument(level = "info", skip(state, answer))]
pub async fn submit_answer(
  state: &AppState,
  session_id: &str,
  task_index: usize,
  answer: &Answer,
) -> Result<AnswerOutcome, SessionError> {
  // Session state is committed under the write lock; store I/O happens after it is released.
  let (task, island, correct, mistakes, step, finished) = {
    let mut sessions = state.sessions.write().await;
    let session = sessions
      .get_mut(session_id)
      .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
    if task_index != session.step {
      return Err(SessionError::OutOfOrder { expected: session.step, got: task_index });
    }
    let Some(task) = session.tasks.get(session.step).cloned() else {
      return Err(SessionError::UnknownSession(session_id.to_string()));
    };

    let correct = task.is_correct(answer);
    if correct {
      session.step += 1;
    } else {
      session.mistakes += 1;
    }
    let (island, mistakes, step) = (session.island, session.mistakes, session.step);
    let done = correct && step >= session.tasks.len();
    // Removing under the write lock makes completion happen exactly once.
    let finished = if done { sessions.remove(session_id) } else { None };
    (task, island, correct, mistakes, step, finished)
  };

  record_attempt(state, &task, answer, correct, island).await;
  if !correct {
    debug!(target: "session", id = %session_id, task_index, mistakes, "Wrong answer");
  }

  let Some(finished) = finished else {
    return Ok(AnswerOutcome {
      correct,
      mistakes,
      next_task: Some(step),
      completed: false,
      profile: None,
    });
  };

  let profile = complete_session(state, &finished).await;
  Ok(AnswerOutcome {
    correct,
    mistakes: finished.mistakes,
    next_task: None,
    completed: true,
    profile: Some(profile),
  })
}

async fn record_attempt(state: &AppState, task: &Task, answer: &Answer, correct: bool, island: Option<u8>) {
  let _records = state.records.lock().await;
  let store = state.store.as_ref();
  let mut analytics: Analytics = load_json(store, ANALYTICS_KEY);
  if correct {
    analytics.record_success(task.kind());
  } else {
    let record = ErrorRecord {
      task_kind: task.kind(),
      prompt: task.prompt.clone(),
      correct_answer: task.correct_answer.clone(),
      user_answer: answer.clone(),
      island,
      timestamp: Utc::now(),
    };
    analytics.record_error(record, state.config.analytics.max_error_records);
  }
  persist(store, ANALYTICS_KEY, &analytics);
}

#[instrument(level = "info", skip(state, session), fields(id = %session.id, mistakes = session.mistakes))]
async fn complete_session(state: &AppState, session: &Session) -> Profile {
  let _records = state.records.lock().await;
  let store = state.store.as_ref();

  let before = load_profile(store);
  let after = apply_session_result(&before, session.mistakes);
  persist(store, PROFILE_KEY, &after);

  let mut analytics: Analytics = load_json(store, ANALYTICS_KEY);
  analytics.record_session(
    SessionRecord {
      island: session.island,
      mistakes: session.mistakes,
      level: session.params.level,
      timestamp: Utc::now(),
    },
    state.config.analytics.max_session_records,
  );
  persist(store, ANALYTICS_KEY, &analytics);

  if let Some(island) = session.island {
    let mut map: IslandProgress = load_json(store, PROGRESS_KEY);
    map.record_finish(island, session.mistakes);
    persist(store, PROGRESS_KEY, &map);
  }

  info!(
    target: "session",
    from_level = %before.level,
    to_level = %after.level,
    modifier = %after.next_difficulty_modifier,
    points = after.points,
    "Session completed"
  );
  after
}

/// One task outside any session. Without a kind, the standard selection policy picks one.
pub fn preview_task(kind: Option<TaskKind>, level: Level, modifier: Modifier, hard_mode: bool) -> Task {
  let mut rng = rand::thread_rng();
  match kind {
    Some(k) => generate(k, level, modifier, hard_mode, &mut rng),
    None => random_task(level, modifier, hard_mode, Track::Standard, &mut rng),
  }
}

pub fn current_profile(state: &AppState) -> Profile {
  load_profile(state.store.as_ref())
}

#[instrument(level = "info", skip(state))]
pub async fn reset_profile(state: &AppState) -> Profile {
  let _records = state.records.lock().await;
  let profile = Profile::default();
  persist(state.store.as_ref(), PROFILE_KEY, &profile);
  info!(target: "session", "Profile reset");
  profile
}

pub fn analytics_snapshot(state: &AppState) -> Analytics {
  load_json(state.store.as_ref(), ANALYTICS_KEY)
}

#[instrument(level = "info", skip(state))]
pub async fn reset_analytics(state: &AppState) {
  let _records = state.records.lock().await;
  persist(state.store.as_ref(), ANALYTICS_KEY, &Analytics::default());
  info!(target: "session", "Analytics reset");
}

pub fn island_progress(state: &AppState) -> IslandProgress {
  load_json(state.store.as_ref(), PROGRESS_KEY)
}

#[cfg(test)]
pub(crate) mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::config::{AppConfig, SessionsConfig};
  use crate::store::{save_profile, MemoryStore, StoreError};

  pub(crate) fn memory_state() -> AppState {
    AppState::with_store(AppConfig::default(), Arc::new(MemoryStore::new()))
  }

  fn wrong_option(task: &Task) -> Answer {
    task
      .options
      .iter()
      .find(|o| **o != task.correct_answer)
      .cloned()
      .expect("every task has a distractor")
  }

  async fn play(state: &AppState, session: &Session, mistakes_on_first: u32) -> AnswerOutcome {
    let mut last = None;
    for (i, task) in session.tasks.iter().enumerate() {
      if i == 0 {
        for _ in 0..mistakes_on_first {
          let out = submit_answer(state, &session.id, 0, &wrong_option(task)).await.expect("answer");
          assert!(!out.correct);
        }
      }
      last = Some(submit_answer(state, &session.id, i, &task.correct_answer).await.expect("answer"));
    }
    last.expect("three tasks")
  }

  #[tokio::test]
  async fn clean_session_levels_up_and_completes_once() {
    let state = memory_state();
    let session = start_session(&state, None, Track::Standard).await.expect("start");
    assert_eq!(session.tasks.len(), 3);
    assert_eq!(session.params.level, Level::EASIEST);

    let out = play(&state, &session, 0).await;
    assert!(out.completed);
    let profile = out.profile.expect("profile on completion");
    assert_eq!(profile.level.get(), 2);
    assert_eq!(profile.next_difficulty_modifier, Modifier::Harder);
    assert_eq!(profile.points, 5);
    assert_eq!(current_profile(&state), profile);

    let again = submit_answer(&state, &session.id, 2, &session.tasks[2].correct_answer).await;
    assert!(matches!(again, Err(SessionError::UnknownSession(_))));
    assert_eq!(current_profile(&state).tasks_completed, 1);
  }

  #[tokio::test]
  async fn mistakes_are_counted_and_recorded() {
    let state = memory_state();
    let session = start_session(&state, None, Track::Standard).await.expect("start");
    let out = play(&state, &session, 3).await;
    assert_eq!(out.mistakes, 3);
    let profile = out.profile.expect("profile");
    assert_eq!(profile.level, Level::EASIEST);
    assert_eq!(profile.next_difficulty_modifier, Modifier::Easier);
    assert_eq!(profile.total_mistakes, 3);

    let analytics = analytics_snapshot(&state);
    assert_eq!(analytics.error_history.len(), 3);
    assert_eq!(analytics.session_history.len(), 1);
    let first_kind = session.tasks[0].kind().as_str();
    assert!(analytics.task_type_stats[first_kind].errors >= 3);

    reset_analytics(&state).await;
    assert_eq!(analytics_snapshot(&state), Analytics::default());
  }

  #[tokio::test]
  async fn answers_must_follow_task_order() {
    let state = memory_state();
    let session = start_session(&state, None, Track::Gentle).await.expect("start");
    let err = submit_answer(&state, &session.id, 1, &session.tasks[1].correct_answer).await;
    assert!(matches!(err, Err(SessionError::OutOfOrder { expected: 0, got: 1 })));
    let live = state.get_session(&session.id).await.expect("still running");
    assert_eq!((live.step, live.mistakes), (0, 0));
  }

  #[tokio::test]
  async fn islands_gate_sessions_and_unlock_in_order() {
    let state = memory_state();
    assert!(matches!(start_session(&state, Some(9), Track::Standard).await, Err(SessionError::UnknownIsland(9))));
    assert!(matches!(start_session(&state, Some(2), Track::Standard).await, Err(SessionError::IslandLocked(2))));

    let s1 = start_session(&state, Some(1), Track::Standard).await.expect("island 1");
    assert!(!s1.hard_mode);
    play(&state, &s1, 0).await;
    assert!(island_progress(&state).is_unlocked(2));

    let mut map = island_progress(&state);
    map.record_finish(3, 0);
    persist(state.store.as_ref(), PROGRESS_KEY, &map);
    let s5 = start_session(&state, Some(5), Track::Standard).await.expect("island 5");
    assert!(s5.hard_mode);
  }

  #[tokio::test]
  async fn next_session_uses_the_stored_parameters() {
    let state = memory_state();
    let stored = Profile { level: Level::HARDEST, next_difficulty_modifier: Modifier::Easier, ..Profile::default() };
    save_profile(state.store.as_ref(), &stored).expect("save");
    let session = start_session(&state, None, Track::Standard).await.expect("start");
    assert_eq!(session.params.level, Level::HARDEST);
    assert_eq!(session.params.modifier, Modifier::Easier);
    assert!(session.tasks.iter().all(|t| t.level == Level::HARDEST));

    let reset = reset_profile(&state).await;
    assert_eq!(reset, Profile::default());
    assert_eq!(current_profile(&state), Profile::default());
  }

  #[tokio::test]
  async fn abandoned_sessions_do_not_accumulate() {
    let config = AppConfig { sessions: SessionsConfig { max_live: 25, ttl_minutes: 60 }, ..AppConfig::default() };
    let state = AppState::with_store(config, Arc::new(MemoryStore::new()));
    let mut newest = None;
    for _ in 0..200 {
      newest = Some(start_session(&state, None, Track::Gentle).await.expect("start"));
    }
    assert_eq!(state.sessions.read().await.len(), 25);
    let newest = newest.expect("started");
    assert!(state.get_session(&newest.id).await.is_some());
  }

  #[tokio::test]
  async fn grading_releases_the_session_map_before_recording() {
    let state = Arc::new(memory_state());
    let session = start_session(&state, None, Track::Standard).await.expect("start");
    let records = state.records.lock().await;

    let pending = {
      let state = Arc::clone(&state);
      let id = session.id.clone();
      let answer = session.tasks[0].correct_answer.clone();
      tokio::spawn(async move { submit_answer(&state, &id, 0, &answer).await })
    };
    for _ in 0..10 {
      tokio::task::yield_now().await;
    }

    // Analytics are still waiting on the records lock, yet the step is committed and the map is free.
    assert!(!pending.is_finished());
    assert!(state.sessions.try_read().is_ok());
    assert_eq!(state.get_session(&session.id).await.expect("live").step, 1);

    drop(records);
    let out = pending.await.expect("join").expect("answer");
    assert_eq!(out.next_task, Some(1));
    let kind = session.tasks[0].kind();
    assert_eq!(analytics_snapshot(&state).task_type_stats[kind.as_str()].total, 1);
  }

  struct ReadOnlyStore;

  impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Option<String> {
      None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
      Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")))
    }
  }

  #[tokio::test]
  async fn failed_saves_still_return_the_computed_profile() {
    let state = AppState::with_store(AppConfig::default(), Arc::new(ReadOnlyStore));
    let session = start_session(&state, None, Track::Standard).await.expect("start");
    let out = play(&state, &session, 2).await;
    let profile = out.profile.expect("profile");
    assert_eq!(profile.total_mistakes, 2);
    assert_eq!(profile.level, Level::EASIEST);
  }

  #[test]
  fn preview_honours_an_explicit_kind() {
    let task = preview_task(Some(TaskKind::Pattern), Level::clamped(2), Modifier::Neutral, false);
    assert_eq!(task.kind(), TaskKind::Pattern);
    let task = preview_task(None, Level::EASIEST, Modifier::Easier, false);
    assert!(matches!(task.kind(), TaskKind::Addition | TaskKind::Subtraction));
  }
}
