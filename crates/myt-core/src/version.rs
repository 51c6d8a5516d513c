use std::path::Path;

use crate::error::{MytError, MytResult};
use crate::render_path::sorted_subdirs;
use crate::SHOW;

/// Prefix of a version label.
pub const VERSION_INDICATOR: char = 'v';

/// Labels are three digits wide and ordered by name, so this is the last one
/// that still sorts after its predecessors.
pub const MAX_VERSION: u32 = 999;

/// Format a version number as `v###`.
pub fn format_version(version: u32) -> String {
    format!("{VERSION_INDICATOR}{version:03}")
}

/// Number of the newest existing version folder in `dir`, 0 if there is none.
pub fn current_version(dir: &Path) -> MytResult<u32> {
    let dirs: Vec<String> = sorted_subdirs(dir)?
        .iter()
        .filter_map(|d| d.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|name| name.contains(SHOW))
        .collect();

    let Some(last) = dirs.last() else {
        return Ok(0);
    };

    let tail = last
        .rsplit_once(VERSION_INDICATOR)
        .map_or(last.as_str(), |(_, tail)| tail);
    Ok(tail
        .trim()
        .parse::<u32>()
        .unwrap_or(dirs.len() as u32))
}

/// Next version label for the render folder `dir`.
pub fn new_version(dir: &Path) -> MytResult<String> {
    let next = current_version(dir)?
        .checked_add(1)
        .filter(|n| *n <= MAX_VERSION)
        .ok_or_else(|| MytError::VersionOverflow {
            dir: dir.to_path_buf(),
            max: MAX_VERSION,
        })?;
    Ok(format_version(next))
}
