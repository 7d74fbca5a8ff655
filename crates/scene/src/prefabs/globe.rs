use serde::{Deserialize, Serialize};

use crate::components::Transform;

/// Radius of the stock high-resolution sphere mesh in model units.
pub const BASE_MODEL_RADIUS: f64 = 0.025;

/// Horizontal offset baked into the stock sphere's texture mapping.
pub const BASE_MODEL_TEXTURE_MAP_OFFSET_X: f64 = 0.033;

/// Static description of the globe mesh the quiz is played on.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeModel {
    #[serde(default = "default_radius")]
    pub base_radius: f64,
    /// Informational: the lookup does not shift `u` by this amount.
    #[serde(default = "default_texture_offset")]
    pub texture_offset_x: f64,
}

fn default_radius() -> f64 {
    BASE_MODEL_RADIUS
}

fn default_texture_offset() -> f64 {
    BASE_MODEL_TEXTURE_MAP_OFFSET_X
}

impl Default for GlobeModel {
    fn default() -> Self {
        Self {
            base_radius: BASE_MODEL_RADIUS,
            texture_offset_x: BASE_MODEL_TEXTURE_MAP_OFFSET_X,
        }
    }
}

impl GlobeModel {
    /// World-space radius, assuming uniform scale (the X factor is used).
    pub fn world_radius(&self, transform: &Transform) -> f64 {
        transform.scale[0] * self.base_radius
    }
}
