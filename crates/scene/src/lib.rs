pub mod components;
pub mod picking;
pub mod prefabs;

pub use picking::*;
