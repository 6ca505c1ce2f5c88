//! Masking and spatial join of georeferenced crowns.

use crate::inventory::{InventoryPointSet, InventoryRecord};
use crate::spatial::{BoundaryMask, GeoDetection};
use geo::Contains;

/// Whether a crown touches the boundary mask.
pub fn keep(crown: &GeoDetection, mask: &BoundaryMask) -> bool {
    mask.intersects(&crown.rect)
}

/// Inventory records whose point lies strictly inside the crown.
///
/// Points exactly on the crown's edge do not match.
pub fn join<'a>(crown: &GeoDetection, inventory: &'a InventoryPointSet) -> Vec<&'a InventoryRecord> {
    inventory
        .records()
        .iter()
        .filter(|record| crown.rect.contains(&record.point()))
        .collect()
}

/// Drop every crown that does not touch the mask.
pub fn mask(crowns: Vec<GeoDetection>, boundary: &BoundaryMask) -> Vec<GeoDetection> {
    crowns.into_iter().filter(|c| keep(c, boundary)).collect()
}

/// A crown paired with one inventory record it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrownMatch {
    /// Index into the crowns passed to [`fuse`].
    pub crown: usize,
    /// Index into [`InventoryPointSet::records`].
    pub record: usize,
}

/// Inner spatial join of crowns against the inventory.
///
/// Emits one match per (crown, contained record) pair. Crowns that contain
/// no record produce nothing.
pub fn fuse(crowns: &[GeoDetection], inventory: &InventoryPointSet) -> Vec<CrownMatch> {
    crowns
        .iter()
        .enumerate()
        .flat_map(|(crown_idx, crown)| {
            inventory
                .records()
                .iter()
                .enumerate()
                .filter(|(_, record)| crown.rect.contains(&record.point()))
                .map(move |(record_idx, _)| CrownMatch {
                    crown: crown_idx,
                    record: record_idx,
                })
        })
        .collect()
}
