//! Per-learner analytics: wrong-answer history, per-kind stats, and session summaries.
//!
//! Histories are capped (newest entries win). Stats are keyed by the task kind's
//! wire name so old records stay readable if kinds are added.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Answer, Level, TaskKind};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
  pub task_kind: TaskKind,
  pub prompt: String,
  pub correct_answer: Answer,
  pub user_answer: Answer,
  #[serde(default)]
  pub island: Option<u8>,
  pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
  pub total: u32,
  pub errors: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
  #[serde(default)]
  pub island: Option<u8>,
  pub mistakes: u32,
  pub level: Level,
  pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analytics {
  pub error_history: Vec<ErrorRecord>,
  pub task_type_stats: BTreeMap<String, KindStats>,
  pub session_history: Vec<SessionRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRate {
  /// Percentage, 0..=100.
  pub error_rate: f64,
  pub total: u32,
  pub errors: u32,
}

fn keep_newest<T>(items: &mut Vec<T>, cap: usize) {
  if items.len() > cap {
    items.drain(..items.len() - cap);
  }
}

impl Analytics {
  pub fn record_error(&mut self, record: ErrorRecord, cap: usize) {
    let stats = self.task_type_stats.entry(record.task_kind.as_str().to_string()).or_default();
    stats.total += 1;
    stats.errors += 1;
    self.error_history.push(record);
    keep_newest(&mut self.error_history, cap);
  }

  pub fn record_success(&mut self, kind: TaskKind) {
    self.task_type_stats.entry(kind.as_str().to_string()).or_default().total += 1;
  }

  pub fn record_session(&mut self, record: SessionRecord, cap: usize) {
    self.session_history.push(record);
    keep_newest(&mut self.session_history, cap);
  }

  /// Error rate per kind, only for kinds seen at least once.
  pub fn error_rates(&self) -> BTreeMap<String, ErrorRate> {
    self
      .task_type_stats
      .iter()
      .filter(|(_, s)| s.total > 0)
      .map(|(k, s)| {
        let rate = ErrorRate {
          error_rate: s.errors as f64 / s.total as f64 * 100.0,
          total: s.total,
          errors: s.errors,
        };
        (k.clone(), rate)
      })
      .collect()
  }

  /// Newest first.
  pub fn recent_errors(&self, limit: usize) -> Vec<ErrorRecord> {
    self.error_history.iter().rev().take(limit).cloned().collect()
  }
}
