//! Error type shared by every render step.
//!
//! The `Display` text of each variant is what ends up in the batch report, so
//! messages are written for the person who launched the render.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MytError {
    #[error("Path does not exist: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("Not a Harmony scene: {name}")]
    NotHarmonyScene { name: String },

    #[error("Not a My Turn! scene: {stem}")]
    NotProjectScene { stem: String },

    #[error("{message}")]
    InvalidFilename { message: String },

    #[error("Could not find directory: '{}'", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Version limit reached in {}: v{max:03} is the last allocatable version", dir.display())]
    VersionOverflow { dir: PathBuf, max: u32 },

    #[error("Harmony failure: {scene}")]
    RendererFailure { scene: String },

    #[error("Could not launch {}: {source}", program.display())]
    RendererLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed render info: {message}")]
    RenderInfo { message: String },

    #[error("Node not found: {name}")]
    NodeNotFound { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type MytResult<T> = Result<T, MytError>;

impl MytError {
    pub fn invalid_filename(msg: impl Into<String>) -> Self {
        Self::InvalidFilename {
            message: msg.into(),
        }
    }

    pub fn render_info(msg: impl Into<String>) -> Self {
        Self::RenderInfo {
            message: msg.into(),
        }
    }

    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }
}
