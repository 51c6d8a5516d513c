//! Keep a compositing session's project range in step with its footage.
//!
//! The compositor is reached through [`CompositorSession`]; a host binding
//! implements it on top of the application's scripting API.

use crate::error::{MytError, MytResult};

/// Read node whose range is used when none is named.
pub const DEFAULT_READ_NODE: &str = "Read1";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRange {
    pub first: f64,
    pub last: f64,
}

pub trait CompositorSession {
    /// Original first/last frame of a node's source, `None` if the node does
    /// not exist.
    fn original_range(&self, node: &str) -> Option<FrameRange>;

    fn set_project_range(&mut self, range: FrameRange);
}

/// Copy a node's original frame range into the project settings.
pub fn sync_project_frame_range<S: CompositorSession + ?Sized>(
    session: &mut S,
    node: &str,
) -> MytResult<FrameRange> {
    let range = session
        .original_range(node)
        .ok_or_else(|| MytError::NodeNotFound {
            name: node.to_string(),
        })?;
    session.set_project_range(range);
    Ok(range)
}
