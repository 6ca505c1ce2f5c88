//! CSV crown table writer.

use crate::constants::{COORD_DECIMAL_PLACES, SCORE_DECIMAL_PLACES};
use crate::error::{Error, Result};
use crate::output::{CrownRow, CrownTableWriter, rect_to_wkt};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Fixed leading columns of every crown table.
const CROWN_COLUMNS: [&str; 12] = [
    "image", "crown_id", "label", "score", "xmin", "ymin", "xmax", "ymax", "min_lon", "min_lat",
    "max_lon", "max_lat",
];

/// CSV crown table writer.
///
/// Geometry is written as a WKT polygon in the last column. When inventory
/// columns are given, the matched tree's position and attributes follow the
/// crown columns.
pub struct CsvCrownWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    inventory_columns: Option<Vec<String>>,
}

impl CsvCrownWriter {
    /// Create a new CSV writer.
    pub fn new(path: &Path, inventory_columns: Option<Vec<String>>) -> Result<Self> {
        let writer = csv::Writer::from_path(path).map_err(|e| table_error(path, e))?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            inventory_columns,
        })
    }
}

impl CrownTableWriter for CsvCrownWriter {
    fn write_header(&mut self) -> Result<()> {
        let mut header: Vec<&str> = CROWN_COLUMNS.to_vec();
        if let Some(columns) = &self.inventory_columns {
            header.push("tree_latitude");
            header.push("tree_longitude");
            header.extend(columns.iter().map(String::as_str));
        }
        header.push("geometry");

        self.writer
            .write_record(&header)
            .map_err(|e| table_error(&self.path, e))
    }

    fn write_row(&mut self, row: &CrownRow<'_>) -> Result<()> {
        let bbox = &row.crown.detection.bbox;
        let rect = &row.crown.rect;
        let coord = |v: f64| format!("{v:.prec$}", prec = COORD_DECIMAL_PLACES);

        let mut fields = vec![
            row.image.to_string(),
            row.crown_id.to_string(),
            row.crown.detection.label.clone(),
            format!(
                "{:.prec$}",
                row.crown.detection.score,
                prec = SCORE_DECIMAL_PLACES
            ),
            format!("{:.1}", bbox.xmin),
            format!("{:.1}", bbox.ymin),
            format!("{:.1}", bbox.xmax),
            format!("{:.1}", bbox.ymax),
            coord(rect.min().x),
            coord(rect.min().y),
            coord(rect.max().x),
            coord(rect.max().y),
        ];

        if let Some(columns) = &self.inventory_columns {
            match row.record {
                Some(record) => {
                    fields.push(record.latitude().to_string());
                    fields.push(record.longitude().to_string());
                    fields.extend(record.attributes().iter().cloned());
                }
                None => fields.extend(std::iter::repeat_n(String::new(), columns.len() + 2)),
            }
        }

        fields.push(rect_to_wkt(rect));

        self.writer
            .write_record(&fields)
            .map_err(|e| table_error(&self.path, e))
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn table_error(path: &Path, e: csv::Error) -> Error {
    Error::TableWrite {
        path: path.to_path_buf(),
        source: Box::new(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::detect::{Detection, PixelBox};
    use crate::inventory::InventoryRecord;
    use crate::spatial::GeoDetection;
    use geo::{Rect, coord};
    use tempfile::NamedTempFile;

    fn crown() -> GeoDetection {
        GeoDetection {
            detection: Detection::new(PixelBox::new(40.0, 40.0, 60.0, 60.0), 0.9123),
            rect: Rect::new(
                coord! { x: 114.1698, y: 22.2998 },
                coord! { x: 114.1702, y: 22.3002 },
            ),
        }
    }

    #[test]
    fn test_mask_table() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = CsvCrownWriter::new(file.path(), None).unwrap();
        let crown = crown();

        writer.write_header().unwrap();
        writer
            .write_row(&CrownRow {
                image: "park_01.jpg",
                crown_id: 0,
                crown: &crown,
                record: None,
            })
            .unwrap();
        writer.finalize().unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("image,crown_id,label,score"));
        assert!(lines[0].ends_with(",geometry"));
        assert!(!lines[0].contains("tree_latitude"));
        assert!(lines[1].starts_with("park_01.jpg,0,Tree,0.9123,40.0,40.0,60.0,60.0"));
        assert!(lines[1].contains("\"POLYGON (("));
    }

    #[test]
    fn test_fusion_table_with_attributes() {
        let file = NamedTempFile::new().unwrap();
        let columns = vec!["Species".to_string(), "Risk_Level".to_string()];
        let mut writer = CsvCrownWriter::new(file.path(), Some(columns)).unwrap();
        let crown = crown();
        let record = InventoryRecord::new(
            22.3,
            114.17,
            vec!["Banyan".to_string(), "Low".to_string()],
        );

        writer.write_header().unwrap();
        writer
            .write_row(&CrownRow {
                image: "park_01.jpg",
                crown_id: 0,
                crown: &crown,
                record: Some(&record),
            })
            .unwrap();
        writer.finalize().unwrap();

        let mut reader = csv::Reader::from_path(file.path()).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[12], "tree_latitude");
        assert_eq!(&headers[14], "Species");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][12], "22.3");
        assert_eq!(&rows[0][14], "Banyan");
        assert_eq!(&rows[0][15], "Low");
        assert!(rows[0][16].starts_with("POLYGON (("));
    }

    #[test]
    fn test_header_only_when_no_rows() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = CsvCrownWriter::new(file.path(), Some(vec!["Species".to_string()])).unwrap();
        writer.write_header().unwrap();
        writer.finalize().unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }
}
