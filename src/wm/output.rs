//! Output record
//!
//! The core only needs three facts about a monitor: its full box in the
//! output layout (fullscreen target), the usable area left over after
//! persistent shell surfaces (tiling target), and its frame pacing for
//! animation frame counts. Mode-setting and hotplug live elsewhere.

use crate::geometry::Rect;
use crate::wm::WorkspaceId;

#[derive(Debug, Clone)]
pub struct Output {
    /// Full output rectangle in layout coordinates.
    pub geometry: Rect,

    /// Output rectangle minus reserved shell-layer space (bars, docks).
    pub usable_area: Rect,

    /// Duration of one output frame in milliseconds.
    pub frame_duration_ms: u32,

    /// Workspaces bound to this output, in creation order.
    pub workspaces: Vec<WorkspaceId>,
}

impl Output {
    pub fn new(geometry: Rect, usable_area: Rect, frame_duration_ms: u32) -> Self {
        Self {
            geometry,
            usable_area,
            // Zero frame duration would make animations divide by zero.
            frame_duration_ms: frame_duration_ms.max(1),
            workspaces: Vec::new(),
        }
    }
}
