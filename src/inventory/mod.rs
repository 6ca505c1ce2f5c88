//! Municipal tree inventory.

mod loader;

pub use loader::load_inventory;

use crate::spatial::LatLon;
use geo::Point;

/// One inventoried tree.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRecord {
    latitude: f64,
    longitude: f64,
    attributes: Vec<String>,
}

impl InventoryRecord {
    /// Create a record. `attributes` follow the owning set's column order.
    pub const fn new(latitude: f64, longitude: f64, attributes: Vec<String>) -> Self {
        Self {
            latitude,
            longitude,
            attributes,
        }
    }

    /// Latitude in degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Position of the tree.
    pub const fn position(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    /// Position as a `geo` point (x = longitude, y = latitude).
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Attribute values in column order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

/// Every inventory record plus the attribute column names.
#[derive(Debug, Clone, Default)]
pub struct InventoryPointSet {
    columns: Vec<String>,
    records: Vec<InventoryRecord>,
}

impl InventoryPointSet {
    /// Create a point set from attribute column names and records.
    pub const fn new(columns: Vec<String>, records: Vec<InventoryRecord>) -> Self {
        Self { columns, records }
    }

    /// Attribute column names (coordinates excluded).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All records in input order.
    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the inventory has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record attribute by column name.
    pub fn attribute<'a>(&self, record: &'a InventoryRecord, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| record.attributes.get(idx))
            .map(String::as_str)
    }
}
