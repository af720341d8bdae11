//! Snapshot record and summary types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One named series of per-cell values within a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Full-resolution spatial state at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileSnapshot {
    pub positions_m: Vec<f64>,
    pub fields: Vec<FieldSeries>,
}

/// One named derived scalar (e.g. a domain-wide aggregate).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedScalar {
    pub name: String,
    pub value: f64,
}

/// Optional derived quantities attached to a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DerivedSnapshot {
    pub scalars: Vec<DerivedScalar>,
}

/// The bulk per-snapshot payload, stored as one self-contained JSON frame
/// per line of a job's append-only data file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotRecord {
    pub time_s: f64,
    pub profile: ProfileSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedSnapshot>,
}

/// Lightweight scalar digest of one snapshot, kept centrally per job.
///
/// Appended exactly once per persisted record, in strictly increasing
/// `sequence_index` and non-decreasing `time_s`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotSummary {
    pub time_s: f64,
    pub sequence_index: u64,
    pub scalar_summaries: BTreeMap<String, f64>,
    pub bookmarked: bool,
}

impl SnapshotSummary {
    /// Digest a record: its derived scalars plus min/max/mean of each field.
    pub fn from_record(record: &SnapshotRecord, sequence_index: u64) -> Self {
        let mut scalar_summaries = BTreeMap::new();

        if let Some(derived) = &record.derived {
            for scalar in &derived.scalars {
                scalar_summaries.insert(scalar.name.clone(), scalar.value);
            }
        }

        for field in &record.profile.fields {
            if field.values.is_empty() {
                continue;
            }
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            let mut sum = 0.0;
            for &v in &field.values {
                min = min.min(v);
                max = max.max(v);
                sum += v;
            }
            scalar_summaries.insert(format!("{}_min", field.name), min);
            scalar_summaries.insert(format!("{}_max", field.name), max);
            scalar_summaries.insert(
                format!("{}_mean", field.name),
                sum / field.values.len() as f64,
            );
        }

        Self {
            time_s: record.time_s,
            sequence_index,
            scalar_summaries,
            bookmarked: false,
        }
    }
}
