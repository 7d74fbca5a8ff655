//! World-atlas GeoJSON.
//!
//! Accepts a `FeatureCollection` whose features carry `Polygon` or
//! `MultiPolygon` geometries in `[lon, lat]` degrees (the layout of the
//! `world-atlas` country sets). Feature order is preserved; downstream
//! lookups rely on it for tie-breaking.

use std::path::Path;

use foundation::math::{GeoCoordinate, Polygon, Ring};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum AtlasGeometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl AtlasGeometry {
    /// Geometry as a list of polygons, regardless of variant.
    pub fn into_polygons(self) -> Vec<Polygon> {
        match self {
            AtlasGeometry::Polygon(rings) => vec![rings],
            AtlasGeometry::MultiPolygon(polys) => polys,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtlasFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: AtlasGeometry,
}

impl AtlasFeature {
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atlas {
    pub features: Vec<AtlasFeature>,
}

#[derive(Debug, thiserror::Error)]
pub enum AtlasParseError {
    #[error("failed to read atlas file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("atlas is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
}

impl Atlas {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AtlasParseError> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path).map_err(|source| AtlasParseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let atlas = Self::from_geojson_str(&payload)?;
        tracing::debug!(path = %path.display(), features = atlas.features.len(), "atlas loaded");
        Ok(atlas)
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, AtlasParseError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, AtlasParseError> {
        let obj = value
            .as_object()
            .ok_or(AtlasParseError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(AtlasParseError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(AtlasParseError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(AtlasParseError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let invalid = |reason: String| AtlasParseError::InvalidFeature { index, reason };

            let feat_obj = feat_val
                .as_object()
                .ok_or_else(|| invalid("feature must be an object".to_string()))?;

            let feat_type = feat_obj
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid("feature missing type".to_string()))?;
            if feat_type != "Feature" {
                return Err(invalid(format!("unexpected feature type: {feat_type}")));
            }

            let id = match feat_obj.get("id") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };

            let properties = feat_obj
                .get("properties")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();

            let geometry_val = feat_obj
                .get("geometry")
                .ok_or_else(|| invalid("feature missing geometry".to_string()))?;
            let geometry = parse_geometry(geometry_val).map_err(invalid)?;

            features.push(AtlasFeature {
                id,
                properties,
                geometry,
            });
        }

        Ok(Self { features })
    }
}

fn parse_geometry(value: &Value) -> Result<AtlasGeometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Polygon" => Ok(AtlasGeometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => Ok(AtlasGeometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<GeoCoordinate, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoCoordinate::new(lon, lat))
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_point(item)?);
    }
    Ok(out)
}

fn parse_polygon(coords: &Value) -> Result<Polygon, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_ring(ring)?);
    }
    Ok(out)
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Polygon>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        out.push(parse_polygon(poly)?);
    }
    Ok(out)
}
