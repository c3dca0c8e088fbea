//! Error types shared across the simulation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// An entity cannot exist without at least one animation frame.
    #[error("no frames loaded for {0}")]
    EmptyFrames(String),

    #[error("unknown animation state '{0}'")]
    UnknownAnimationState(String),

    #[error("stage {0} is not configured")]
    UnknownStage(u32),

    #[error("stage table is invalid: {0}")]
    InvalidStageTable(String),

    #[error("unknown item kind '{0}'")]
    UnknownItemKind(String),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Failures reported by an audio sink.  Gameplay never stops for these.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    Device(String),

    #[error("channel {0} out of range")]
    Channel(usize),
}
