//! Answers spatio-temporal neighbor queries against the enriched record set.
//!
//! A query names a reference (day, area) and returns every enriched row within
//! a distance radius and a trailing day window of it, tagged with its
//! great-circle distance. The filter builds its lookup structures once per
//! query session: a (day, area) map for reference resolution, per-area
//! day-sorted row lists, and an R-tree over one site per coordinate-bearing
//! area. Results are identical to a full linear scan, row order included.

use crate::neighbor::error::NeighborError;
use crate::types::coordinate::LatLon;
use crate::types::record::{AreaId, EnrichedRecord, NeighborResult};
use haversine::{distance, Location as HaversineLocation, Units};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use std::collections::HashMap;

/// Default search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 500.0;

/// Default trailing day window, reference day included. A window of 14 keeps
/// rows with `day >= reference_day - 13`.
pub const DEFAULT_DAY_WINDOW: u32 = 14;

// Conservative floor for kilometers per degree, used only to pad the R-tree
// envelope; every candidate is still verified with the haversine distance.
const KM_PER_DEGREE_FLOOR: f64 = 110.0;
// Above this latitude the envelope degenerates; fall back to scanning all sites.
const MAX_PREFILTER_LAT: f64 = 85.0;

/// Great-circle distance between two coordinates in kilometers, on a sphere of
/// radius 6371 km. Symmetric, and zero only for identical coordinates.
pub fn distance_km(a: LatLon, b: LatLon) -> f64 {
    distance(
        HaversineLocation {
            latitude: a.0,
            longitude: a.1,
        },
        HaversineLocation {
            latitude: b.0,
            longitude: b.1,
        },
        Units::Kilometers,
    )
}

/// One distinct coordinate-bearing area, as stored in the R-tree.
#[derive(Debug, Clone)]
struct AreaSite {
    area: AreaId,
    position: LatLon,
}

impl RTreeObject for AreaSite {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.0, self.position.1])
    }
}

impl PointDistance for AreaSite {
    // Squared Euclidean distance in degree space; only used to order and prune
    // R-tree traversal, never as the real distance.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position.0 - point[0];
        let dy = self.position.1 - point[1];
        dx * dx + dy * dy
    }
}

/// Query index over a borrowed slice of enriched records.
pub struct NeighborFilter<'a> {
    records: &'a [EnrichedRecord],
    by_day_area: HashMap<(u32, AreaId), usize>,
    rows_by_area: HashMap<AreaId, Vec<usize>>,
    sites: RTree<AreaSite>,
    radius_km: f64,
    day_window: u32,
}

impl<'a> NeighborFilter<'a> {
    /// Builds the query index with the default 500 km radius and 14-day window.
    pub fn new(records: &'a [EnrichedRecord]) -> Self {
        Self::with_limits(records, DEFAULT_RADIUS_KM, DEFAULT_DAY_WINDOW)
    }

    /// Builds the query index with explicit limits. A day window of 0 is
    /// clamped to 1 (the reference day alone).
    pub fn with_limits(records: &'a [EnrichedRecord], radius_km: f64, day_window: u32) -> Self {
        let mut by_day_area = HashMap::new();
        let mut rows_by_area: HashMap<AreaId, Vec<usize>> = HashMap::new();
        let mut area_coords: HashMap<AreaId, LatLon> = HashMap::new();

        for (row, enriched) in records.iter().enumerate() {
            let area = &enriched.record.area;
            // First matching row wins on duplicate (day, area) keys.
            by_day_area
                .entry((enriched.record.day, area.clone()))
                .or_insert(row);
            rows_by_area.entry(area.clone()).or_default().push(row);
            if let Some(coord) = enriched.coordinate {
                area_coords.entry(area.clone()).or_insert(coord);
            }
        }

        for rows in rows_by_area.values_mut() {
            rows.sort_by_key(|&row| records[row].record.day);
        }

        let sites = RTree::bulk_load(
            area_coords
                .into_iter()
                .map(|(area, position)| AreaSite { area, position })
                .collect(),
        );

        Self {
            records,
            by_day_area,
            rows_by_area,
            sites,
            radius_km,
            day_window: day_window.max(1),
        }
    }

    /// Resolves the coordinate of the first row matching `(day, area)`.
    ///
    /// # Errors
    ///
    /// [`NeighborError::ReferenceNotFound`] if no such row exists, and
    /// [`NeighborError::ReferenceWithoutCoordinate`] if the row exists but its
    /// area is missing from the coordinate index.
    pub fn resolve_reference(&self, day: u32, area: &str) -> Result<LatLon, NeighborError> {
        let row = self
            .by_day_area
            .get(&(day, area.to_string()))
            .ok_or_else(|| NeighborError::ReferenceNotFound {
                day,
                area: area.to_string(),
            })?;
        self.records[*row]
            .coordinate
            .ok_or_else(|| NeighborError::ReferenceWithoutCoordinate {
                day,
                area: area.to_string(),
            })
    }

    /// Returns every row within the radius and trailing day window of the
    /// reference, tagged with its distance, in input row order.
    ///
    /// Rows without coordinates never match: no distance can be computed for
    /// them.
    pub fn query(
        &self,
        reference_day: u32,
        reference_area: &str,
    ) -> Result<Vec<NeighborResult>, NeighborError> {
        let reference = self.resolve_reference(reference_day, reference_area)?;
        let earliest_day = reference_day.saturating_sub(self.day_window - 1);

        let mut matches: Vec<(usize, f64)> = Vec::new();
        for site in self.candidate_sites(reference) {
            let dist = distance_km(reference, site.position);
            if dist > self.radius_km {
                continue;
            }
            let rows = &self.rows_by_area[&site.area];
            let first = rows.partition_point(|&row| self.records[row].record.day < earliest_day);
            for &row in &rows[first..] {
                if self.records[row].record.day > reference_day {
                    break;
                }
                matches.push((row, dist));
            }
        }

        // The area-first traversal above scrambles row order; restore input
        // order before returning.
        matches.sort_unstable_by_key(|&(row, _)| row);
        Ok(matches
            .into_iter()
            .map(|(row, dist)| NeighborResult {
                record: self.records[row].clone(),
                distance_km: dist,
            })
            .collect())
    }

    /// Superset of the sites possibly within the radius, from a padded-degree
    /// envelope query. Near the poles or the antimeridian the envelope is not
    /// trustworthy and every site is scanned instead.
    fn candidate_sites(&self, center: LatLon) -> Vec<&AreaSite> {
        let lat_pad = self.radius_km / KM_PER_DEGREE_FLOOR;
        let (lat_min, lat_max) = (center.0 - lat_pad, center.0 + lat_pad);
        if lat_min <= -MAX_PREFILTER_LAT || lat_max >= MAX_PREFILTER_LAT {
            return self.sites.iter().collect();
        }

        let cos_floor = lat_min.abs().max(lat_max.abs()).to_radians().cos();
        let lng_pad = self.radius_km / (KM_PER_DEGREE_FLOOR * cos_floor);
        let (lng_min, lng_max) = (center.1 - lng_pad, center.1 + lng_pad);
        if lng_min < -180.0 || lng_max > 180.0 {
            return self.sites.iter().collect();
        }

        self.sites
            .locate_in_envelope_intersecting(&AABB::from_corners(
                [lat_min, lng_min],
                [lat_max, lng_max],
            ))
            .collect()
    }
}
