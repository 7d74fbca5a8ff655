//! Static country lookup built once from the world atlas.
//!
//! Names are unique keys. The index never changes after construction, so a
//! shared reference can be read from anywhere.

use std::collections::HashMap;

use formats::Atlas;
use foundation::math::{GeoCoordinate, Polygon, multi_polygon_contains};
use rand::Rng;

/// Position of a country in atlas order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryId(pub usize);

/// Lon/lat bounding box used to skip polygons cheaply.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoBounds {
    pub min: GeoCoordinate,
    pub max: GeoCoordinate,
}

impl GeoBounds {
    fn of(polygons: &[Polygon]) -> Option<Self> {
        let mut points = polygons.iter().flatten().flatten();
        let first = *points.next()?;
        let mut b = GeoBounds {
            min: first,
            max: first,
        };
        for p in points {
            b.min.lon_deg = b.min.lon_deg.min(p.lon_deg);
            b.min.lat_deg = b.min.lat_deg.min(p.lat_deg);
            b.max.lon_deg = b.max.lon_deg.max(p.lon_deg);
            b.max.lat_deg = b.max.lat_deg.max(p.lat_deg);
        }
        Some(b)
    }

    pub fn contains(&self, p: GeoCoordinate) -> bool {
        p.lon_deg >= self.min.lon_deg
            && p.lon_deg <= self.max.lon_deg
            && p.lat_deg >= self.min.lat_deg
            && p.lat_deg <= self.max.lat_deg
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub name: String,
    pub polygons: Vec<Polygon>,
    bounds: Option<GeoBounds>,
}

impl CountryFeature {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        let bounds = GeoBounds::of(&polygons);
        Self {
            name: name.into(),
            polygons,
            bounds,
        }
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    pub fn contains(&self, p: GeoCoordinate) -> bool {
        match self.bounds {
            Some(b) if b.contains(p) => multi_polygon_contains(&self.polygons, p),
            _ => false,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CountryIndexError {
    #[error("atlas contains no countries")]
    Empty,
    #[error("feature at index {index} has no string `name` property")]
    MissingName { index: usize },
    #[error("country name `{name}` appears more than once")]
    DuplicateName { name: String },
}

#[derive(Debug, Clone, Default)]
pub struct CountryIndex {
    features: Vec<CountryFeature>,
    names: Vec<String>,
    by_name: HashMap<String, CountryId>,
}

impl CountryIndex {
    pub fn from_features(features: Vec<CountryFeature>) -> Result<Self, CountryIndexError> {
        if features.is_empty() {
            return Err(CountryIndexError::Empty);
        }
        let mut by_name = HashMap::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            if by_name.insert(feature.name.clone(), CountryId(idx)).is_some() {
                return Err(CountryIndexError::DuplicateName {
                    name: feature.name.clone(),
                });
            }
        }
        let names = features.iter().map(|f| f.name.clone()).collect();
        Ok(Self {
            features,
            names,
            by_name,
        })
    }

    pub fn from_atlas(atlas: Atlas) -> Result<Self, CountryIndexError> {
        let mut features = Vec::with_capacity(atlas.features.len());
        for (index, feature) in atlas.features.into_iter().enumerate() {
            let name = feature
                .name()
                .ok_or(CountryIndexError::MissingName { index })?
                .to_string();
            features.push(CountryFeature::new(name, feature.geometry.into_polygons()));
        }
        let index = Self::from_features(features)?;
        tracing::info!(countries = index.len(), "country index built");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Country names in atlas order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn id_of(&self, name: &str) -> Option<CountryId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&CountryFeature> {
        self.id_of(name).map(|id| &self.features[id.0])
    }

    pub fn feature(&self, id: CountryId) -> Option<&CountryFeature> {
        self.features.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CountryId, &CountryFeature)> {
        self.features
            .iter()
            .enumerate()
            .map(|(i, f)| (CountryId(i), f))
    }

    /// Whether the named country contains `p`. Unknown names contain nothing.
    pub fn contains(&self, name: &str, p: GeoCoordinate) -> bool {
        self.get(name).is_some_and(|f| f.contains(p))
    }

    /// Uniformly random country name: `floor(len * uniform[0, 1))`.
    pub fn random_name<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.names.is_empty() {
            return None;
        }
        let r: f64 = rng.r#gen();
        let idx = ((self.names.len() as f64 * r).floor() as usize).min(self.names.len() - 1);
        Some(self.names[idx].as_str())
    }
}
