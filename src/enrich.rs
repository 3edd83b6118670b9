//! Joins window records against the coordinate index.
//!
//! A streaming one-to-one transform: every input row produces exactly one
//! output row in the same position. Rows whose area is unknown to the index
//! keep empty coordinate fields rather than being dropped.

use crate::coord_index::index::CoordinateIndex;
use crate::types::record::{EnrichedRecord, WindowRecord};
use log::info;

/// Attaches coordinates to each record by area-id lookup.
pub fn enrich(records: Vec<WindowRecord>, index: &CoordinateIndex) -> Vec<EnrichedRecord> {
    let total = records.len();
    let mut matched = 0usize;
    let enriched: Vec<EnrichedRecord> = records
        .into_iter()
        .map(|record| {
            let coordinate = index.get(&record.area);
            if coordinate.is_some() {
                matched += 1;
            }
            EnrichedRecord { record, coordinate }
        })
        .collect();
    info!("Enriched {}/{} records with coordinates", matched, total);
    enriched
}
