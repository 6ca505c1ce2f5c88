//! Inventory table loading.
//!
//! Reads a CSV with one tree per row. Two columns hold the coordinates,
//! every other column is kept verbatim as an attribute.

use crate::config::InventoryConfig;
use crate::error::{Error, Result};
use crate::inventory::{InventoryPointSet, InventoryRecord};
use std::path::Path;
use tracing::{debug, info};

/// Load the inventory table at `path`.
///
/// # Errors
///
/// Returns [`Error::DataLoad`] if the file is missing, a coordinate column
/// is absent, or any coordinate fails to parse or is out of range.
pub fn load_inventory(path: &Path, config: &InventoryConfig) -> Result<InventoryPointSet> {
    let data_err = |reason: String| Error::DataLoad {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| data_err(e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| data_err(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let lat_idx = find_column(&headers, &config.latitude_column)
        .ok_or_else(|| data_err(format!("missing column '{}'", config.latitude_column)))?;
    let lon_idx = find_column(&headers, &config.longitude_column)
        .ok_or_else(|| data_err(format!("missing column '{}'", config.longitude_column)))?;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != lat_idx && *idx != lon_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut records = Vec::new();

    for (row_num, result) in reader.records().enumerate() {
        // Header is line 1
        let line = row_num + 2;
        let row = result.map_err(|e| data_err(format!("line {line}: {e}")))?;

        let latitude = parse_coordinate(row.get(lat_idx), &config.latitude_column, 90.0)
            .map_err(|reason| data_err(format!("line {line}: {reason}")))?;
        let longitude = parse_coordinate(row.get(lon_idx), &config.longitude_column, 180.0)
            .map_err(|reason| data_err(format!("line {line}: {reason}")))?;

        let attributes = row
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != lat_idx && *idx != lon_idx)
            .map(|(_, value)| value.to_string())
            .collect();

        records.push(InventoryRecord::new(latitude, longitude, attributes));
    }

    info!(
        "Loaded {} inventory trees from {}",
        records.len(),
        path.display()
    );
    debug!("Inventory attribute columns: {}", columns.join(", "));

    Ok(InventoryPointSet::new(columns, records))
}

/// Case-insensitive column lookup.
fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn parse_coordinate(value: Option<&str>, column: &str, limit: f64) -> std::result::Result<f64, String> {
    let raw = value.unwrap_or_default();
    let parsed: f64 = raw
        .parse()
        .map_err(|_| format!("{column} '{raw}' is not a valid number"))?;

    if !parsed.is_finite() || !(-limit..=limit).contains(&parsed) {
        return Err(format!(
            "{column} {parsed} out of range (-{limit} to {limit})"
        ));
    }

    Ok(parsed)
}
