//! Query helpers for extracting data from materialized datasets.

use lf_cache::Dataset;

use crate::error::{AppError, AppResult};

/// Summary of a dataset's shape and time range.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub time_range: (f64, f64),
    pub snapshot_count: usize,
    pub cell_count: usize,
    pub field_names: Vec<String>,
}

/// Get a shape summary for a dataset.
pub fn dataset_summary(dataset: &Dataset) -> AppResult<DatasetSummary> {
    if dataset.times_s.is_empty() {
        return Err(AppError::InvalidInput("No snapshots in dataset".to_string()));
    }

    let t_min = dataset.times_s.first().copied().unwrap_or(0.0);
    let t_max = dataset.times_s.last().copied().unwrap_or(0.0);

    Ok(DatasetSummary {
        time_range: (t_min, t_max),
        snapshot_count: dataset.times_s.len(),
        cell_count: dataset.positions_m.len(),
        field_names: list_field_names(dataset),
    })
}

/// List all field names in a dataset.
pub fn list_field_names(dataset: &Dataset) -> Vec<String> {
    dataset.fields.iter().map(|f| f.name.clone()).collect()
}

/// Extract the time series of one field at one cell.
pub fn extract_cell_series(
    dataset: &Dataset,
    field: &str,
    cell_index: usize,
) -> AppResult<Vec<(f64, f64)>> {
    let matrix = dataset
        .field(field)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown field: {}", field)))?;
    if cell_index >= dataset.positions_m.len() {
        return Err(AppError::InvalidInput(format!(
            "Cell index {} out of range ({} cells)",
            cell_index,
            dataset.positions_m.len()
        )));
    }

    Ok(dataset
        .times_s
        .iter()
        .zip(matrix.rows.iter())
        .map(|(&t, row)| (t, row[cell_index]))
        .collect())
}

/// Extract a derived scalar series by name.
pub fn extract_derived_series(dataset: &Dataset, name: &str) -> AppResult<Vec<(f64, f64)>> {
    let series = dataset
        .derived
        .get(name)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown derived scalar: {}", name)))?;

    Ok(dataset
        .times_s
        .iter()
        .zip(series.iter())
        .map(|(&t, &v)| (t, v))
        .collect())
}
