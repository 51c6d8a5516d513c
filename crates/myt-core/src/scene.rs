use std::path::Path;

use crate::error::{MytError, MytResult};
use crate::SHOW;

/// Extension of a Harmony scene file.
pub const SCENE_EXTENSION: &str = "xstage";

/// Check that a path is an existing Harmony scene belonging to the show.
pub fn verify(scene: &Path) -> MytResult<()> {
    if !scene.exists() {
        return Err(MytError::PathNotFound {
            path: scene.to_path_buf(),
        });
    }

    let is_scene = scene
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e == SCENE_EXTENSION);
    if !is_scene {
        return Err(MytError::NotHarmonyScene {
            name: lossy_name(scene),
        });
    }

    let stem = scene
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !stem.contains(SHOW) {
        return Err(MytError::NotProjectScene { stem });
    }

    Ok(())
}

fn lossy_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
