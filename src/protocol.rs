//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Field names are camelCase on the wire; tasks are sent whole, answers included.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::achievements::ACHIEVEMENTS;
use crate::analytics::{Analytics, ErrorRate, ErrorRecord, SessionRecord};
use crate::domain::{Answer, Level, Modifier, Task, TaskKind, Track};
use crate::logic::AnswerOutcome;
use crate::profile::Profile;
use crate::state::Session;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession {
        #[serde(default)]
        island: Option<u8>,
        #[serde(default)]
        track: Track,
    },
    SubmitAnswer {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "taskIndex")]
        task_index: usize,
        answer: Answer,
    },
    GetProfile,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        session: SessionOut,
    },
    AnswerResult(AnswerOut),
    Profile {
        profile: Profile,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for session delivery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub session_id: String,
    pub level: Level,
    pub modifier: Modifier,
    pub hard_mode: bool,
    pub island: Option<u8>,
    pub track: Track,
    pub tasks: Vec<Task>,
}

pub fn to_out(s: &Session) -> SessionOut {
    SessionOut {
        session_id: s.id.clone(),
        level: s.params.level,
        modifier: s.params.modifier,
        hard_mode: s.hard_mode,
        island: s.island,
        track: s.track,
        tasks: s.tasks.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionIn {
    pub island: Option<u8>,
    pub track: Track,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIn {
    pub session_id: String,
    pub task_index: usize,
    pub answer: Answer,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub correct: bool,
    pub mistakes: u32,
    pub completed: bool,
    pub next_task: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl From<AnswerOutcome> for AnswerOut {
    fn from(o: AnswerOutcome) -> Self {
        AnswerOut {
            correct: o.correct,
            mistakes: o.mistakes,
            completed: o.completed,
            next_task: o.next_task,
            profile: o.profile,
        }
    }
}

/// Preview query; absent fields fall back to the learner's next-session parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub kind: Option<TaskKind>,
    pub level: Option<i64>,
    pub modifier: Option<Modifier>,
    pub hard_mode: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AchievementOut {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

/// Whole catalogue, flagged against the profile's unlocked ids.
pub fn achievements_out(profile: &Profile) -> Vec<AchievementOut> {
    ACHIEVEMENTS
        .iter()
        .map(|a| AchievementOut {
            id: a.id,
            title: a.title,
            description: a.description,
            unlocked: profile.achievements.iter().any(|u| u == a.id),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOut {
    pub error_rates: BTreeMap<String, ErrorRate>,
    pub recent_errors: Vec<ErrorRecord>,
    pub sessions: Vec<SessionRecord>,
}

pub fn analytics_out(a: &Analytics, recent: usize) -> AnalyticsOut {
    AnalyticsOut {
        error_rates: a.error_rates(),
        recent_errors: a.recent_errors(recent),
        sessions: a.session_history.clone(),
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub message: String,
}
