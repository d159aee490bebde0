//! Sample records as the backend returns them, plus the PATCH body builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque sample identifier assigned by the backend.
pub type SampleId = i64;

/// A collected sample. The client holds a read/write projection; the backend
/// owns the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: SampleId,
    pub address_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    /// Scanned cassette identifier. Until this is set the sample's detail
    /// fields are locked and the timer may not start.
    #[serde(default)]
    pub cassette_barcode: Option<String>,
    #[serde(default)]
    pub is_inside: Option<bool>,
    #[serde(default)]
    pub flow_rate: Option<i64>,
    #[serde(default)]
    pub volume_required: Option<i64>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stop_time: Option<DateTime<Utc>>,
    /// Server-computed run duration as a Postgres interval string.
    #[serde(default)]
    pub total_time_ran: Option<String>,
    #[serde(default)]
    pub fields: Option<i64>,
    #[serde(default)]
    pub fibers: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Sample {
    /// Whether the cassette barcode has been scanned. Gates detail editing
    /// and the Start transition.
    pub fn is_scanned(&self) -> bool {
        self.cassette_barcode.is_some()
    }

    /// Run phase derived from the persisted times.
    pub fn run_phase(&self) -> RunPhase {
        match (&self.start_time, &self.stop_time) {
            (None, _) => RunPhase::NotStarted,
            (Some(_), None) => RunPhase::Running,
            (Some(_), Some(_)) => RunPhase::Stopped,
        }
    }
}

/// Lifecycle phase of a sample's run.
///
/// `stop_time` is only meaningful once `start_time` is set, so a record with
/// no start time is NotStarted regardless of its stop time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    NotStarted,
    Running,
    Stopped,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::NotStarted => write!(f, "not started"),
            RunPhase::Running => write!(f, "running"),
            RunPhase::Stopped => write!(f, "stopped"),
        }
    }
}

/// Builder for a partial sample update.
///
/// The backend treats omitted fields as "leave untouched" and explicit nulls
/// as "clear", so the builder keeps the two apart: a field is only present in
/// the body once its setter has been called, and setters taking `None` insert
/// a JSON null.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SamplePatch(Map<String, Value>);

impl SamplePatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    fn set_opt_ts(self, key: &str, value: Option<DateTime<Utc>>) -> Self {
        let value = match value {
            Some(ts) => Value::String(ts.to_rfc3339()),
            None => Value::Null,
        };
        self.set(key, value)
    }

    fn set_opt_i64(self, key: &str, value: Option<i64>) -> Self {
        let value = match value {
            Some(n) => Value::from(n),
            None => Value::Null,
        };
        self.set(key, value)
    }

    pub fn description(self, value: &str) -> Self {
        self.set("description", Value::String(value.to_string()))
    }

    pub fn cassette_barcode(self, value: Option<&str>) -> Self {
        let value = match value {
            Some(s) => Value::String(s.to_string()),
            None => Value::Null,
        };
        self.set("cassette_barcode", value)
    }

    pub fn is_inside(self, value: Option<bool>) -> Self {
        let value = match value {
            Some(b) => Value::Bool(b),
            None => Value::Null,
        };
        self.set("is_inside", value)
    }

    pub fn flow_rate(self, value: Option<i64>) -> Self {
        self.set_opt_i64("flow_rate", value)
    }

    pub fn volume_required(self, value: Option<i64>) -> Self {
        self.set_opt_i64("volume_required", value)
    }

    pub fn fields(self, value: Option<i64>) -> Self {
        self.set_opt_i64("fields", value)
    }

    pub fn fibers(self, value: Option<i64>) -> Self {
        self.set_opt_i64("fibers", value)
    }

    pub fn start_time(self, value: Option<DateTime<Utc>>) -> Self {
        self.set_opt_ts("start_time", value)
    }

    pub fn stop_time(self, value: Option<DateTime<Utc>>) -> Self {
        self.set_opt_ts("stop_time", value)
    }

    /// True if no setter has been called.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
