use std::error::Error;
use std::path::PathBuf;

use formats::AtlasParseError;
use game::ConfigError;
use layers::CountryIndexError;

/// Anything that can stop the quiz effect from wiring itself to the host.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("scene object `{0}` not found")]
    MissingObject(&'static str),
    #[error("invalid game config")]
    Config(#[from] ConfigError),
    #[error("failed to read config `{path}`")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config `{path}`")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to load world atlas")]
    Atlas(#[from] AtlasParseError),
    #[error("failed to index countries")]
    Countries(#[from] CountryIndexError),
}

/// `outer: inner: innermost` rendering of an error and its sources.
pub fn error_chain(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}
