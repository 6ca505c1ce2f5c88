//! GeoJSON crown table writer.

use crate::error::{Error, Result};
use crate::output::{CrownRow, CrownTableWriter, rect_ring};
use serde_json::{Map, Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writer collecting crowns into a single `FeatureCollection`.
///
/// Features are buffered and serialized on [`CrownTableWriter::finalize`].
pub struct GeoJsonCrownWriter {
    path: PathBuf,
    inventory_columns: Option<Vec<String>>,
    features: Vec<Value>,
}

impl GeoJsonCrownWriter {
    /// Create a new GeoJSON writer.
    pub fn new(path: &Path, inventory_columns: Option<Vec<String>>) -> Self {
        Self {
            path: path.to_path_buf(),
            inventory_columns,
            features: Vec::new(),
        }
    }
}

impl CrownTableWriter for GeoJsonCrownWriter {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_row(&mut self, row: &CrownRow<'_>) -> Result<()> {
        let detection = &row.crown.detection;
        let bbox = &detection.bbox;

        let mut properties = Map::new();
        properties.insert("image".into(), json!(row.image));
        properties.insert("crown_id".into(), json!(row.crown_id));
        properties.insert("label".into(), json!(detection.label));
        properties.insert("score".into(), json!(detection.score));
        properties.insert(
            "pixel_box".into(),
            json!([bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax]),
        );

        if let (Some(columns), Some(record)) = (&self.inventory_columns, row.record) {
            properties.insert("tree_latitude".into(), json!(record.latitude()));
            properties.insert("tree_longitude".into(), json!(record.longitude()));
            for (column, value) in columns.iter().zip(record.attributes()) {
                properties.insert(column.clone(), json!(value));
            }
        }

        let ring: Vec<[f64; 2]> = rect_ring(&row.crown.rect)
            .iter()
            .map(|&(x, y)| [x, y])
            .collect();

        self.features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [ring],
            },
            "properties": properties,
        }));

        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let collection = json!({
            "type": "FeatureCollection",
            "features": std::mem::take(&mut self.features),
        });

        let file = File::create(&self.path).map_err(|e| self.table_error(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &collection)
            .map_err(|e| self.table_error(e))?;
        writer.flush().map_err(|e| self.table_error(e))
    }
}

impl GeoJsonCrownWriter {
    fn table_error(&self, e: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::TableWrite {
            path: self.path.clone(),
            source: Box::new(e),
        }
    }
}
