//! Interactive move/resize grabs
//!
//! One grab may be active at a time; starting a second is rejected.
//! Starting a grab on a tiled toplevel lifts it out of its stack list and
//! immediately fills a master vacancy from the slaves; where the toplevel
//! lands when the grab ends depends on where it is dropped. Pointer
//! motion during a grab streams geometry requests computed from the
//! grab-start snapshot.

use bitflags::bitflags;
use tracing::debug;

use crate::geometry::{Point, Rect};
use crate::wm::scene::Shell;
use crate::wm::workspace::Role;
use crate::wm::{ToplevelId, WindowManager};

bitflags! {
    /// Edges active during an interactive resize.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResizeEdges: u32 {
        const TOP = 1;
        const BOTTOM = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

/// The process-wide grab slot.
#[derive(Debug, Clone, Copy, Default)]
pub enum GrabState {
    #[default]
    Idle,
    Moving {
        toplevel: ToplevelId,
        start_cursor: Point,
        start_box: Rect,
    },
    Resizing {
        toplevel: ToplevelId,
        start_cursor: Point,
        start_box: Rect,
        edges: ResizeEdges,
    },
}

impl GrabState {
    pub fn is_active(&self) -> bool {
        !matches!(self, GrabState::Idle)
    }

    pub fn toplevel(&self) -> Option<ToplevelId> {
        match self {
            GrabState::Idle => None,
            GrabState::Moving { toplevel, .. } | GrabState::Resizing { toplevel, .. } => {
                Some(*toplevel)
            },
        }
    }
}

/// Which corner of the box is closest to the cursor, as a resize edge
/// mask. Used to start a corner resize from anywhere inside a toplevel.
pub fn closest_corner(cursor: Point, rect: Rect) -> ResizeEdges {
    let left_distance = cursor.x - rect.x;
    let right_distance = rect.width as i32 - left_distance;
    let top_distance = cursor.y - rect.y;
    let bottom_distance = rect.height as i32 - top_distance;

    let mut edges = ResizeEdges::empty();
    edges |= if left_distance <= right_distance { ResizeEdges::LEFT } else { ResizeEdges::RIGHT };
    edges |= if top_distance <= bottom_distance { ResizeEdges::TOP } else { ResizeEdges::BOTTOM };
    edges
}

impl WindowManager {
    /// Begin an interactive move. No-op while another grab is active.
    pub fn start_move(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        let Some(start_box) = self.prepare_grab(shell, id) else { return };
        self.grab = GrabState::Moving { toplevel: id, start_cursor: self.cursor, start_box };
        debug!(toplevel = id.0, "move grab started");
    }

    /// Begin an interactive resize. No-op while another grab is active.
    pub fn start_resize(&mut self, shell: &mut dyn Shell, id: ToplevelId, edges: ResizeEdges) {
        let Some(start_box) = self.prepare_grab(shell, id) else { return };
        self.grab =
            GrabState::Resizing { toplevel: id, start_cursor: self.cursor, start_box, edges };
        debug!(toplevel = id.0, ?edges, "resize grab started");
    }

    /// Shared grab admission: check preconditions, snapshot geometry and
    /// lift the toplevel out of its membership list.
    fn prepare_grab(&mut self, shell: &mut dyn Shell, id: ToplevelId) -> Option<Rect> {
        if self.grab.is_active() {
            debug!(toplevel = id.0, "grab rejected, another grab is active");
            return None;
        }
        let tl = self.toplevel(id)?;
        if !tl.mapped || tl.fullscreen {
            return None;
        }
        let start_box = tl.current;
        let workspace = tl.workspace;

        // A grabbed toplevel is in no membership list and receives no
        // frame ticks; finish any running animation at the committed box.
        if let Some(tl) = self.toplevel_mut(id) {
            if tl.animation.running {
                tl.animation.running = false;
                shell.set_node_position(id, start_box.position());
            }
        }

        self.prev_focused = self.focused;

        match self.workspace_mut(workspace).remove(id) {
            Some(Role::Master) => {
                // The last slave fills the vacancy immediately; the
                // grabbed toplevel's destination is decided at release.
                let ws = self.workspace_mut(workspace);
                if let Some(promoted) = ws.slaves.pop() {
                    ws.masters.push(promoted);
                }
                self.reflow_workspace(shell, workspace);
            },
            Some(Role::Slave) => self.reflow_workspace(shell, workspace),
            Some(Role::Floating) | None => {},
        }

        Some(start_box)
    }

    /// A pointer motion sample. Updates the cursor and, during a grab,
    /// turns the delta from the grab start into a geometry request.
    pub fn pointer_motion(&mut self, shell: &mut dyn Shell, position: Point) {
        self.cursor = position;

        match self.grab {
            GrabState::Idle => {},
            GrabState::Moving { toplevel, start_cursor, start_box } => {
                let Some(tl) = self.toplevel(toplevel) else { return };
                let size = tl.current.size();
                let rect = Rect::new(
                    start_box.x + (position.x - start_cursor.x),
                    start_box.y + (position.y - start_cursor.y),
                    size.width,
                    size.height,
                );
                self.set_pending_geometry(shell, toplevel, rect);
            },
            GrabState::Resizing { toplevel, start_cursor, start_box, edges } => {
                let configured_min = self.config.min_toplevel_size;
                let Some(tl) = self.toplevel_mut(toplevel) else { return };
                tl.resizing = true;
                let min_width = tl.min_size.width.max(configured_min) as i32;
                let min_height = tl.min_size.height.max(configured_min) as i32;

                let rect =
                    resize_box(start_box, edges, position, start_cursor, min_width, min_height);
                self.set_pending_geometry(shell, toplevel, rect);
            },
        }
    }

    /// Pointer button released: the grab is over. The toplevel re-enters
    /// a membership list based on where it was dropped, and focus returns
    /// to the pre-grab holder.
    pub fn end_grab(&mut self, shell: &mut dyn Shell) {
        let grab = std::mem::take(&mut self.grab);
        let Some(id) = grab.toplevel() else { return };

        let floating = match self.toplevel_mut(id) {
            Some(tl) => {
                tl.resizing = false;
                tl.floating
            },
            None => return,
        };

        if floating {
            self.insert_floating(shell, id);
        } else {
            let drop_point = self.cursor;
            self.insert_tiled_at(shell, id, drop_point);
        }

        if let Some(prev) = self.prev_focused.take() {
            self.focus_toplevel(shell, prev);
        }
        debug!(toplevel = id.0, "grab ended");
    }

    /// Abandon the current grab without waiting for a release. In-flight
    /// geometry requests stay valid and commit on their own ack.
    pub fn cancel_grab(&mut self, shell: &mut dyn Shell) {
        if self.grab.is_active() {
            debug!("grab cancelled");
            self.end_grab(shell);
        }
    }
}

/// Resize math: a moved edge grows or shrinks its dimension against the
/// opposite edge's anchor, clamped to the minimum; the clamp re-anchors
/// the position so the un-moved edge stays fixed.
fn resize_box(
    start_box: Rect,
    edges: ResizeEdges,
    cursor: Point,
    start_cursor: Point,
    min_width: i32,
    min_height: i32,
) -> Rect {
    let dx = cursor.x - start_cursor.x;
    let dy = cursor.y - start_cursor.y;

    let mut x = start_box.x;
    let mut y = start_box.y;
    let mut width = start_box.width as i32;
    let mut height = start_box.height as i32;

    if edges.contains(ResizeEdges::TOP) {
        y = start_box.y + dy;
        height = start_box.height as i32 - dy;
        if height <= min_height {
            y = start_box.y + start_box.height as i32 - min_height;
            height = min_height;
        }
    } else if edges.contains(ResizeEdges::BOTTOM) {
        height = start_box.height as i32 + dy;
        if height <= min_height {
            height = min_height;
        }
    }

    if edges.contains(ResizeEdges::LEFT) {
        x = start_box.x + dx;
        width = start_box.width as i32 - dx;
        if width <= min_width {
            x = start_box.x + start_box.width as i32 - min_width;
            width = min_width;
        }
    } else if edges.contains(ResizeEdges::RIGHT) {
        width = start_box.width as i32 + dx;
        if width <= min_width {
            width = min_width;
        }
    }

    Rect::new(x, y, width as u32, height as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_left_resize_clamps_to_minimum() {
        let start = Rect::new(0, 0, 200, 200);
        let edges = ResizeEdges::TOP | ResizeEdges::LEFT;
        let rect =
            resize_box(start, edges, Point::new(50, 30), Point::new(0, 0), 50, 50);
        assert_eq!(rect, Rect::new(50, 30, 150, 170));

        // Push far past the minimum: the opposite edges stay anchored.
        let rect =
            resize_box(start, edges, Point::new(500, 500), Point::new(0, 0), 50, 50);
        assert_eq!(rect, Rect::new(150, 150, 50, 50));
    }

    #[test]
    fn test_bottom_right_resize_grows() {
        let start = Rect::new(10, 20, 100, 100);
        let edges = ResizeEdges::BOTTOM | ResizeEdges::RIGHT;
        let rect =
            resize_box(start, edges, Point::new(40, 50), Point::new(0, 0), 50, 50);
        assert_eq!(rect, Rect::new(10, 20, 140, 150));
    }

    #[test]
    fn test_closest_corner() {
        let rect = Rect::new(0, 0, 100, 100);
        assert_eq!(
            closest_corner(Point::new(10, 10), rect),
            ResizeEdges::TOP | ResizeEdges::LEFT
        );
        assert_eq!(
            closest_corner(Point::new(90, 80), rect),
            ResizeEdges::BOTTOM | ResizeEdges::RIGHT
        );
    }
}
