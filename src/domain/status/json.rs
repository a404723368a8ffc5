//! JSON projection of status histories
//!
//! Renders `{ "<id>": { "<timestamp>": "<status>", ... }, ... }` with ids
//! in ascending order and each history most recent first. Timestamps are
//! ISO 8601 at second resolution; entries falling into the same second
//! collapse onto the most recent one.

use std::fmt;

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use super::schedule::StatusSchedule;
use super::types::StatusType;

/// Paging and truncation applied by [`status_history_json`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub skip: usize,
    pub take: Option<usize>,
    /// Most-recent entries rendered per entity
    pub history_size: Option<usize>,
}

impl HistoryWindow {
    pub fn all() -> Self {
        Self {
            skip: 0,
            take: None,
            history_size: None,
        }
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::all()
    }
}

pub fn status_history_json<'a, Id, S, I>(entries: I, window: HistoryWindow) -> Value
where
    Id: Ord + fmt::Display + 'a,
    S: StatusType,
    I: IntoIterator<Item = (&'a Id, &'a StatusSchedule<S>)>,
{
    let mut sorted: Vec<_> = entries.into_iter().collect();
    sorted.sort_by(|(a, _), (b, _)| a.cmp(b));

    let take = window.take.unwrap_or(usize::MAX);
    let history_size = window.history_size.unwrap_or(usize::MAX);

    let mut result = Map::new();
    for (id, schedule) in sorted.into_iter().skip(window.skip).take(take) {
        result.insert(id.to_string(), Value::Object(history_object(schedule, history_size)));
    }
    Value::Object(result)
}

/// History of a single schedule as `{ "<timestamp>": "<status>" }`
pub fn schedule_json<S: StatusType>(schedule: &StatusSchedule<S>, history_size: Option<usize>) -> Value {
    Value::Object(history_object(schedule, history_size.unwrap_or(usize::MAX)))
}

fn history_object<S: StatusType>(schedule: &StatusSchedule<S>, history_size: usize) -> Map<String, Value> {
    let mut history = Map::new();
    for entry in schedule.iter().take(history_size) {
        let key = entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        if !history.contains_key(&key) {
            history.insert(key, Value::String(entry.value.to_string()));
        }
    }
    history
}
