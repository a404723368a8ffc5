//! Status histogram over a collection of entities

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

/// JSON-LD context used when none is given
pub const DEFAULT_STATUS_REPORT_CONTEXT: &str =
    "https://open.charging.cloud/contexts/wwcp+json/statusReport";

/// Count of entities per current status, generated at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport<E, S: Ord> {
    context: String,
    generated_at: DateTime<Utc>,
    buckets: BTreeMap<S, u64>,
    total: u64,
    _entity: PhantomData<fn(&E)>,
}

impl<E, S: Ord + Clone> StatusReport<E, S> {
    pub fn generate<'a, I, F>(entities: I, selector: F, timestamp: Option<DateTime<Utc>>) -> Self
    where
        E: 'a,
        I: IntoIterator<Item = &'a E>,
        F: Fn(&E) -> S,
    {
        Self::generate_safe(entities.into_iter().map(Some), selector, timestamp)
    }

    /// Like [`generate`](Self::generate), silently skipping absent entities.
    pub fn generate_safe<'a, I, F>(entities: I, selector: F, timestamp: Option<DateTime<Utc>>) -> Self
    where
        E: 'a,
        I: IntoIterator<Item = Option<&'a E>>,
        F: Fn(&E) -> S,
    {
        let mut buckets = BTreeMap::new();
        let mut total = 0;

        for entity in entities.into_iter().flatten() {
            *buckets.entry(selector(entity)).or_insert(0u64) += 1;
            total += 1;
        }

        Self {
            context: DEFAULT_STATUS_REPORT_CONTEXT.to_string(),
            generated_at: timestamp.unwrap_or_else(Utc::now),
            buckets,
            total,
            _entity: PhantomData,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

impl<E, S: Ord> StatusReport<E, S> {
    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn count(&self, status: &S) -> u64 {
        self.buckets.get(status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&S, u64)> + '_ {
        self.buckets.iter().map(|(status, count)| (status, *count))
    }

    /// Share of entities in `status`, in percent
    pub fn percentage(&self, status: &S) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(status) as f64 * 100.0 / self.total as f64
    }
}

impl<E, S: Ord + fmt::Display> StatusReport<E, S> {
    pub fn to_json(&self) -> Value {
        let mut report = Map::new();
        for (status, count) in &self.buckets {
            report.insert(
                status.to_string(),
                json!({
                    "count": count,
                    "percentage": self.percentage(status),
                }),
            );
        }

        json!({
            "@context": self.context,
            "timestamp": self.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            "count": self.total,
            "report": Value::Object(report),
        })
    }
}
