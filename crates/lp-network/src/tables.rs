//! External-interface tables.
//!
//! These are the three inputs the engine consumes from the results-file
//! subsystem: per-channel static attributes, the downstream connectivity map,
//! and the optional ground-drape samples used for cover checks. The engine
//! only ever reads them; building them from result files is the caller's job.

use std::collections::HashMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::warn;

use lp_core::{ChannelId, LpError, LpResult, Point, Real, ensure_finite, is_connector};

/// Cross-section shape of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    Rectangular,
    Circular,
    /// Open channels, irregular sections, anything without a closed conduit.
    Other,
}

/// Static attributes of one channel, as read from the results layer.
///
/// Unknown dimensions and sentinel inverts are `None`; derived quantities
/// degrade to zero rather than erroring (the engine never aborts on bad data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub kind: ChannelKind,
    pub length: Real,
    pub barrels: u32,
    pub width: Option<Real>,
    pub height: Option<Real>,
    pub us_invert: Option<Real>,
    pub ds_invert: Option<Real>,
    /// Downstream connection angle in degrees; 0.0 means not set.
    pub connection_angle: Real,
    /// Plan-view polyline of the channel, upstream end first. May be empty,
    /// in which case warnings carry no location.
    pub vertices: Vec<Point>,
}

impl ChannelRecord {
    pub fn new(kind: ChannelKind, length: Real) -> Self {
        Self {
            kind,
            length,
            barrels: 1,
            width: None,
            height: None,
            us_invert: None,
            ds_invert: None,
            connection_angle: 0.0,
            vertices: Vec::new(),
        }
    }

    /// Full flow area across all barrels; 0 when the shape or a dimension is
    /// unknown.
    pub fn cross_section_area(&self) -> Real {
        let w = self.width.unwrap_or(0.0);
        let h = self.height.unwrap_or(0.0);
        let n = self.barrels as Real;
        match self.kind {
            ChannelKind::Rectangular => n * w * h,
            ChannelKind::Circular => n * PI * (w / 2.0) * (w / 2.0),
            ChannelKind::Other => 0.0,
        }
    }

    /// Inside rise from invert to obvert: diameter for circular pipes,
    /// section height otherwise.
    pub fn rise(&self) -> Option<Real> {
        match self.kind {
            ChannelKind::Circular => self.width,
            _ => self.height,
        }
    }

    pub fn first_vertex(&self) -> Option<Point> {
        self.vertices.first().copied()
    }

    pub fn second_vertex(&self) -> Option<Point> {
        self.vertices.get(1).copied().or_else(|| self.first_vertex())
    }

    /// Midpoint between the channel's end vertices.
    pub fn midpoint(&self) -> Option<Point> {
        let first = self.first_vertex()?;
        let last = self.vertices.last().copied()?;
        Some(first.midpoint(last))
    }
}

/// All channel records, keyed by channel id.
#[derive(Debug, Clone, Default)]
pub struct ChannelTable {
    records: HashMap<ChannelId, ChannelRecord>,
}

impl ChannelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Rejects non-finite lengths outright; everything else
    /// degrades softly during the walk.
    pub fn insert(&mut self, id: impl Into<ChannelId>, record: ChannelRecord) -> LpResult<()> {
        ensure_finite(record.length, "channel length")?;
        self.records.insert(id.into(), record);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ChannelRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Connector chains longer than this are treated as dangling.
const MAX_CONNECTOR_HOPS: usize = 32;

/// Downstream connectivity map: channel id -> ids immediately downstream.
///
/// Connector pseudo-channels may appear on either side; [`resolve`] maps them
/// to the real channel they feed.
///
/// [`resolve`]: ConnectivityTable::resolve
#[derive(Debug, Clone, Default)]
pub struct ConnectivityTable {
    downstream: HashMap<ChannelId, Vec<ChannelId>>,
}

impl ConnectivityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect<I, S>(&mut self, id: impl Into<ChannelId>, downstream: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<ChannelId>,
    {
        self.downstream
            .entry(id.into())
            .or_default()
            .extend(downstream.into_iter().map(Into::into));
    }

    /// Ids immediately downstream of `id`. Absent ids yield an empty slice:
    /// a channel missing from the table is an implicit outlet.
    pub fn downstream_of(&self, id: &str) -> &[ChannelId] {
        self.downstream.get(id).map_or(&[], Vec::as_slice)
    }

    /// Map a possibly-connector id to the real channel it feeds.
    ///
    /// Real channel ids map to themselves. Connector chains are followed hop
    /// by hop; a connector leading nowhere (or a chain longer than
    /// [`MAX_CONNECTOR_HOPS`]) yields `None`.
    pub fn resolve(&self, id: &str) -> Option<ChannelId> {
        if !is_connector(id) {
            return Some(id.to_string());
        }
        let mut current = id.to_string();
        for _ in 0..MAX_CONNECTOR_HOPS {
            let next = self.downstream_of(&current);
            if next.len() > 1 {
                warn!(connector = %current, count = next.len(), "connector has multiple downstream links; using the first");
            }
            match next.first() {
                None => return None,
                Some(n) if is_connector(n) => current = n.clone(),
                Some(n) => return Some(n.clone()),
            }
        }
        warn!(connector = %id, "connector chain exceeds hop limit; treating as dangling");
        None
    }
}

/// One ground-drape sample along a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSample {
    pub point: Point,
    pub chainage: Real,
    pub elevation: Real,
}

/// Ordered ground-drape samples for one channel, upstream end first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroundProfile {
    samples: Vec<GroundSample>,
}

impl GroundProfile {
    /// Build from the three parallel arrays the drape extractor produces.
    pub fn new(points: Vec<Point>, chainages: Vec<Real>, elevations: Vec<Real>) -> LpResult<Self> {
        if points.len() != chainages.len() {
            return Err(LpError::LengthMismatch {
                what: "ground drape points vs chainages",
                left: points.len(),
                right: chainages.len(),
            });
        }
        if chainages.len() != elevations.len() {
            return Err(LpError::LengthMismatch {
                what: "ground drape chainages vs elevations",
                left: chainages.len(),
                right: elevations.len(),
            });
        }
        let samples = points
            .into_iter()
            .zip(chainages)
            .zip(elevations)
            .map(|((point, chainage), elevation)| GroundSample {
                point,
                chainage,
                elevation,
            })
            .collect();
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[GroundSample] {
        &self.samples
    }
}

/// Ground-drape profiles keyed by channel id. Only populated when a cover
/// limit is configured.
#[derive(Debug, Clone, Default)]
pub struct GroundTable {
    profiles: HashMap<ChannelId, GroundProfile>,
}

impl GroundTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<ChannelId>, profile: GroundProfile) {
        self.profiles.insert(id.into(), profile);
    }

    pub fn get(&self, id: &str) -> Option<&GroundProfile> {
        self.profiles.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangular_area_counts_barrels() {
        let mut rec = ChannelRecord::new(ChannelKind::Rectangular, 10.0);
        rec.width = Some(2.0);
        rec.height = Some(1.5);
        rec.barrels = 2;
        assert_eq!(rec.cross_section_area(), 6.0);
    }

    #[test]
    fn circular_area_uses_diameter() {
        let mut rec = ChannelRecord::new(ChannelKind::Circular, 10.0);
        rec.width = Some(2.0);
        let expected = PI;
        assert!((rec.cross_section_area() - expected).abs() < 1e-12);
    }

    #[test]
    fn missing_dimension_yields_zero_area() {
        let mut rec = ChannelRecord::new(ChannelKind::Rectangular, 10.0);
        rec.width = Some(2.0);
        assert_eq!(rec.cross_section_area(), 0.0);

        let open = ChannelRecord::new(ChannelKind::Other, 10.0);
        assert_eq!(open.cross_section_area(), 0.0);
    }

    #[test]
    fn channel_table_rejects_non_finite_length() {
        let mut table = ChannelTable::new();
        let rec = ChannelRecord::new(ChannelKind::Other, Real::NAN);
        assert!(table.insert("C1", rec).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn missing_connectivity_is_implicit_outlet() {
        let table = ConnectivityTable::new();
        assert!(table.downstream_of("nowhere").is_empty());
    }

    #[test]
    fn resolve_follows_connector_chain() {
        let mut table = ConnectivityTable::new();
        table.connect("A__connector", ["B__connector"]);
        table.connect("B__connector", ["C"]);
        assert_eq!(table.resolve("A__connector"), Some("C".to_string()));
        assert_eq!(table.resolve("C"), Some("C".to_string()));
    }

    #[test]
    fn dangling_connector_resolves_to_none() {
        let table = ConnectivityTable::new();
        assert_eq!(table.resolve("lonely__connector"), None);
    }

    #[test]
    fn connector_cycle_hits_hop_limit() {
        let mut table = ConnectivityTable::new();
        table.connect("a__connector", ["b__connector"]);
        table.connect("b__connector", ["a__connector"]);
        assert_eq!(table.resolve("a__connector"), None);
    }

    #[test]
    fn ground_profile_rejects_mismatched_arrays() {
        let err = GroundProfile::new(vec![Point::new(0.0, 0.0)], vec![0.0, 5.0], vec![10.0, 10.5]);
        assert!(err.is_err());
    }
}
