//! Data models for the sampling client.
//!
//! This module contains the wire-facing data structures:
//! - Sample records and the PATCH body builder
//! - Run phase derived from the persisted times
//! - Address and project projections for the list views

mod sample;
mod site;

pub use sample::{RunPhase, Sample, SampleId, SamplePatch};
pub use site::{Address, Project};
