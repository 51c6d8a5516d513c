use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{MytError, MytResult};
use crate::shot::ShotId;

/// Folder inside each shot directory that receives rendered EXR sequences.
pub const RENDER_SUBDIR: &str = "EXR";

/// List the subdirectories of `dir`, sorted by name.
pub(crate) fn sorted_subdirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// First subdirectory of `parent` (in name order) whose stem ends with `identifier`.
///
/// Suffix matching lets folders carry readable prefixes: "Act 1" matches `1`,
/// "Shot 002" matches `002`.
pub fn find_dir(identifier: &str, parent: &Path) -> MytResult<PathBuf> {
    let dirs =
        sorted_subdirs(parent).map_err(|_| MytError::directory_not_found(parent.to_path_buf()))?;

    dirs.into_iter()
        .find(|d| {
            d.file_stem()
                .map_or(false, |s| s.to_string_lossy().ends_with(identifier))
        })
        .ok_or_else(|| MytError::directory_not_found(parent.join(format!("*{identifier}"))))
}

/// Resolve `<root>/<act dir>/<shot dir>/EXR` for a shot.
pub fn find_render_path(shot: &ShotId, root: &Path) -> MytResult<PathBuf> {
    let act_dir = find_dir(&shot.act.to_string(), root)?;
    let render_dir = find_dir(&shot.number, &act_dir)?.join(RENDER_SUBDIR);
    if render_dir.is_dir() {
        tracing::debug!("{} renders to {}", shot, render_dir.display());
        return Ok(render_dir);
    }
    Err(MytError::directory_not_found(render_dir))
}
