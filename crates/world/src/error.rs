use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid world manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("entity id `{0}` cannot be used as a route segment")]
    InvalidId(String),
    #[error("duplicate entity id `{0}`")]
    DuplicateId(String),
    #[error("no island or section named `{0}`")]
    UnknownIsland(String),
}
