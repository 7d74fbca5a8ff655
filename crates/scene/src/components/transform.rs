use foundation::math::{
    Euler, Vec3, model_to_world, transform_to_forward, world_to_model,
};
use serde::{Deserialize, Serialize};

/// World transform of a scene object: translate, Euler rotation, per-axis
/// scale. The core only ever reads these.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    /// Radians, applied X then Y then Z.
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: unit_scale(),
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position: position.as_array(),
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: Euler) -> Self {
        self.rotation = [rotation.x, rotation.y, rotation.z];
        self
    }

    pub fn with_uniform_scale(mut self, scale: f64) -> Self {
        self.scale = [scale; 3];
        self
    }

    pub fn position(&self) -> Vec3 {
        let [x, y, z] = self.position;
        Vec3::new(x, y, z)
    }

    pub fn rotation(&self) -> Euler {
        let [x, y, z] = self.rotation;
        Euler::new(x, y, z)
    }

    pub fn scale(&self) -> Vec3 {
        let [x, y, z] = self.scale;
        Vec3::new(x, y, z)
    }

    pub fn forward(&self) -> Vec3 {
        transform_to_forward(self.rotation())
    }

    pub fn world_to_model(&self, p: Vec3) -> Vec3 {
        world_to_model(p, self.position(), self.rotation(), self.scale())
    }

    pub fn model_to_world(&self, p: Vec3) -> Vec3 {
        model_to_world(p, self.position(), self.rotation(), self.scale())
    }
}
