use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ring as received on the wire: `[longitude, latitude]` pairs.
///
/// The closing point may be omitted; rings are implicitly closed.
pub type RawRing = Vec<[f64; 2]>;

/// Raw geometry of a service area.
///
/// Three shapes are accepted, from the most to the least nested JSON:
///
/// - a single ring, `[[lng, lat], ...]`, read as a polygon without holes
/// - a polygon, `[[[lng, lat], ...], ...]`, outer ring first, then holes
/// - a multi-polygon, a list of polygons
///
/// The value is kept in the shape it was submitted in; validation and
/// normalization happen when the core builds its canonical geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AreaGeometry {
    Ring(RawRing),
    Polygon(Vec<RawRing>),
    MultiPolygon(Vec<Vec<RawRing>>),
}

impl AreaGeometry {
    /// Member polygons as ring slices (outer ring first).
    pub fn polygons(&self) -> Vec<&[RawRing]> {
        match self {
            Self::Ring(ring) => vec![std::slice::from_ref(ring)],
            Self::Polygon(rings) => vec![rings.as_slice()],
            Self::MultiPolygon(polygons) => polygons.iter().map(Vec::as_slice).collect(),
        }
    }
}

/// A priced region served by exactly one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceArea {
    pub id: Uuid,
    /// Owning provider id.
    pub provider: Uuid,
    pub name: String,
    /// Price in minor currency units (e.g. cents).
    pub price: u64,
    pub area: AreaGeometry,
}

/// Partial service-area update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAreaPatch {
    #[serde(default)]
    pub provider: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    /// Signed so that negative input can be rejected with a field error.
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub area: Option<AreaGeometry>,
}

/// One hit of a point lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedArea {
    pub id: Uuid,
    pub name: String,
    pub provider_name: String,
    /// Minor currency units.
    pub price: u64,
}
