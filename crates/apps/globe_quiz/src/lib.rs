pub mod effect;
pub mod error;
pub mod host;
pub mod replay;
pub mod settings;
pub mod sun;

pub use effect::*;
pub use error::*;
pub use host::*;

/// Small bundled atlas used when no `--atlas` is given.
pub const SAMPLE_ATLAS: &str = include_str!("../../../formats/assets/sample-countries.geojson");
