use std::fs;
use std::path::{Path, PathBuf};

use formats::Atlas;
use game::GameConfig;
use layers::CountryIndex;
use scene::prefabs::GlobeModel;
use tracing::info;

use crate::SAMPLE_ATLAS;
use crate::error::SetupError;

/// Where the country boundaries come from.
#[derive(Debug, Clone, PartialEq)]
pub enum AtlasSource {
    File(PathBuf),
    GeoJson(String),
}

impl Default for AtlasSource {
    fn default() -> Self {
        AtlasSource::GeoJson(SAMPLE_ATLAS.to_string())
    }
}

impl AtlasSource {
    pub fn load(&self) -> Result<CountryIndex, SetupError> {
        let atlas = match self {
            AtlasSource::File(path) => Atlas::from_path(path)?,
            AtlasSource::GeoJson(text) => Atlas::from_geojson_str(text)?,
        };
        Ok(CountryIndex::from_atlas(atlas)?)
    }
}

/// Everything the quiz effect needs besides the host.
#[derive(Debug, Clone)]
pub struct QuizSetup<R> {
    pub config: GameConfig,
    pub globe: GlobeModel,
    pub atlas: AtlasSource,
    pub rng: R,
}

impl<R> QuizSetup<R> {
    pub fn new(config: GameConfig, rng: R) -> Self {
        Self {
            config,
            globe: GlobeModel::default(),
            atlas: AtlasSource::default(),
            rng,
        }
    }

    pub fn with_atlas(mut self, atlas: AtlasSource) -> Self {
        self.atlas = atlas;
        self
    }
}

/// Reads a JSON game config. Missing fields take their defaults.
pub fn load_game_config(path: &Path) -> Result<GameConfig, SetupError> {
    let text = fs::read_to_string(path).map_err(|source| SetupError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GameConfig =
        serde_json::from_str(&text).map_err(|source| SetupError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), rounds = config.total_rounds, "loaded game config");
    Ok(config)
}
