//! Display-ready materialization of a job's snapshot sequence.

use std::collections::BTreeMap;

use lf_core::{JobId, SnapshotRecord};

use crate::{CacheError, CacheResult};

/// One field's values over the whole run: `rows[time_index][cell_index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatrix {
    pub name: String,
    pub rows: Vec<Vec<f64>>,
}

/// Fully materialized, display-oriented form of one job's snapshots.
///
/// Derived and recomputable; never the source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub job_id: JobId,
    pub times_s: Vec<f64>,
    pub positions_m: Vec<f64>,
    pub fields: Vec<FieldMatrix>,
    /// Derived scalar series keyed by name, aligned with `times_s`
    pub derived: BTreeMap<String, Vec<f64>>,
}

impl Dataset {
    /// Build a dataset from an ordered snapshot sequence.
    ///
    /// The first record fixes the coordinate array and the field roster;
    /// later records must carry the same fields at the same resolution.
    /// Derived scalars missing from any record are dropped from the series.
    pub fn from_records(job_id: &str, records: &[SnapshotRecord]) -> CacheResult<Self> {
        let Some(first) = records.first() else {
            return Err(CacheError::NoData {
                job_id: job_id.to_string(),
            });
        };

        let positions_m = first.profile.positions_m.clone();
        let mut times_s = Vec::with_capacity(records.len());
        let mut fields: Vec<FieldMatrix> = first
            .profile
            .fields
            .iter()
            .map(|f| FieldMatrix {
                name: f.name.clone(),
                rows: Vec::with_capacity(records.len()),
            })
            .collect();

        for (idx, record) in records.iter().enumerate() {
            times_s.push(record.time_s);
            for matrix in &mut fields {
                let Some(series) = record
                    .profile
                    .fields
                    .iter()
                    .find(|f| f.name == matrix.name)
                else {
                    return Err(CacheError::Inconsistent {
                        what: format!("snapshot {} dropped field {}", idx, matrix.name),
                    });
                };
                if series.values.len() != positions_m.len() {
                    return Err(CacheError::Inconsistent {
                        what: format!(
                            "snapshot {} resized field {} ({} values for {} cells)",
                            idx,
                            matrix.name,
                            series.values.len(),
                            positions_m.len()
                        ),
                    });
                }
                matrix.rows.push(series.values.clone());
            }
        }

        let mut derived: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        if let Some(first_derived) = &first.derived {
            for scalar in &first_derived.scalars {
                let series: Vec<f64> = records
                    .iter()
                    .filter_map(|r| {
                        r.derived
                            .as_ref()
                            .and_then(|d| d.scalars.iter().find(|s| s.name == scalar.name))
                            .map(|s| s.value)
                    })
                    .collect();
                if series.len() == records.len() {
                    derived.insert(scalar.name.clone(), series);
                }
            }
        }

        Ok(Self {
            job_id: job_id.to_string(),
            times_s,
            positions_m,
            fields,
            derived,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldMatrix> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn snapshot_count(&self) -> usize {
        self.times_s.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_core::{DerivedScalar, DerivedSnapshot, FieldSeries, ProfileSnapshot};

    fn record(time_s: f64, values: Vec<f64>) -> SnapshotRecord {
        SnapshotRecord {
            time_s,
            profile: ProfileSnapshot {
                positions_m: (0..values.len()).map(|i| i as f64).collect(),
                fields: vec![FieldSeries {
                    name: "temperature_k".to_string(),
                    values,
                }],
            },
            derived: Some(DerivedSnapshot {
                scalars: vec![DerivedScalar {
                    name: "mean_temperature_k".to_string(),
                    value: time_s,
                }],
            }),
        }
    }

    #[test]
    fn materializes_times_fields_and_derived_series() {
        let records = vec![
            record(0.0, vec![300.0, 301.0]),
            record(0.1, vec![302.0, 303.0]),
            record(0.2, vec![304.0, 305.0]),
        ];
        let dataset = Dataset::from_records("j1", &records).unwrap();

        assert_eq!(dataset.times_s, vec![0.0, 0.1, 0.2]);
        assert_eq!(dataset.positions_m, vec![0.0, 1.0]);
        let matrix = dataset.field("temperature_k").unwrap();
        assert_eq!(matrix.rows.len(), 3);
        assert_eq!(matrix.rows[1], vec![302.0, 303.0]);
        assert_eq!(dataset.derived["mean_temperature_k"], vec![0.0, 0.1, 0.2]);
    }

    #[test]
    fn empty_sequence_is_no_data() {
        assert!(matches!(
            Dataset::from_records("j1", &[]),
            Err(CacheError::NoData { .. })
        ));
    }

    #[test]
    fn dropped_field_is_inconsistent() {
        let mut second = record(0.1, vec![1.0, 2.0]);
        second.profile.fields.clear();
        let records = vec![record(0.0, vec![1.0, 2.0]), second];
        assert!(matches!(
            Dataset::from_records("j1", &records),
            Err(CacheError::Inconsistent { .. })
        ));
    }

    #[test]
    fn resized_field_is_inconsistent() {
        let records = vec![record(0.0, vec![1.0, 2.0]), record(0.1, vec![1.0])];
        assert!(matches!(
            Dataset::from_records("j1", &records),
            Err(CacheError::Inconsistent { .. })
        ));
    }
}
