//! Address and project projections used by the collection screens.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A sampling address within a project. Samples are collected per address,
/// per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Minimal project projection for headers and navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
}
