pub mod geodesy;
pub mod polygon;
pub mod rotation;
pub mod sphere;
pub mod texture;
pub mod vec;

pub use geodesy::*;
pub use polygon::*;
pub use rotation::*;
pub use sphere::*;
pub use texture::*;
pub use vec::*;
