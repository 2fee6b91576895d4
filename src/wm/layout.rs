//! Master/stack tile layout
//!
//! Masters share the top region of the usable area (the whole of it when
//! no slaves exist), slaves share the bottom half. Every tile spans the
//! full usable width; each list divides its region into equal vertical
//! shares. Dimensions are a pure function of the usable area and the two
//! list lengths, so the initial configure for a joining toplevel can be
//! predicted before it is inserted.

use tracing::debug;

use crate::geometry::{Point, Rect, Size};
use crate::wm::scene::{SceneLayer, Shell};
use crate::wm::{ToplevelId, WindowManager, WorkspaceId};

/// Size every master tile would have with the given occupancy.
pub fn master_dimensions(usable_area: Rect, n_masters: usize, n_slaves: usize) -> Size {
    let n_masters = n_masters.max(1) as u32;
    let region_height =
        if n_slaves > 0 { usable_area.height / 2 } else { usable_area.height };
    Size::new(usable_area.width, region_height / n_masters)
}

/// Size every slave tile would have with the given occupancy.
pub fn slave_dimensions(usable_area: Rect, n_slaves: usize) -> Size {
    let n_slaves = n_slaves.max(1) as u32;
    let region_height = usable_area.height - usable_area.height / 2;
    Size::new(usable_area.width, region_height / n_slaves)
}

/// Target boxes for every master and every slave, in list order.
pub fn tile_layout(
    usable_area: Rect,
    n_masters: usize,
    n_slaves: usize,
) -> (Vec<Rect>, Vec<Rect>) {
    let master_size = master_dimensions(usable_area, n_masters, n_slaves);
    let slave_size = slave_dimensions(usable_area, n_slaves);

    let masters = (0..n_masters)
        .map(|i| {
            Rect::new(
                usable_area.x,
                usable_area.y + i as i32 * master_size.height as i32,
                master_size.width,
                master_size.height,
            )
        })
        .collect();

    let slave_region_y = usable_area.y + (usable_area.height / 2) as i32;
    let slaves = (0..n_slaves)
        .map(|i| {
            Rect::new(
                usable_area.x,
                slave_region_y + i as i32 * slave_size.height as i32,
                slave_size.width,
                slave_size.height,
            )
        })
        .collect();

    (masters, slaves)
}

impl WindowManager {
    /// Recompute and request geometry for every tiled member of the
    /// workspace. Must run after any membership or master-count change.
    /// Suppressed while the workspace has a fullscreen toplevel.
    pub(crate) fn reflow_workspace(&mut self, shell: &mut dyn Shell, workspace: WorkspaceId) {
        let ws = self.workspace(workspace);
        if ws.fullscreen.is_some() {
            return;
        }

        let usable_area = self.output(ws.output).usable_area;
        let (master_boxes, slave_boxes) =
            tile_layout(usable_area, ws.masters.len(), ws.slaves.len());

        let targets: Vec<(ToplevelId, Rect)> = ws
            .masters
            .iter()
            .copied()
            .zip(master_boxes)
            .chain(ws.slaves.iter().copied().zip(slave_boxes))
            .collect();

        for (id, rect) in targets {
            self.set_pending_geometry(shell, id, rect);
        }
    }

    /// The tiled member of the workspace whose committed geometry contains
    /// the point, if any.
    pub fn tiled_toplevel_at(&self, workspace: WorkspaceId, point: Point) -> Option<ToplevelId> {
        self.workspace(workspace)
            .tiled()
            .find(|id| self.toplevel(*id).is_some_and(|tl| tl.current.contains(point)))
    }

    /// Insert a toplevel into the active workspace's tiled lists at a drop
    /// point, then reflow.
    ///
    /// With nothing under the point the toplevel appends to the masters if
    /// capacity remains, else to the slaves. Otherwise it lands before or
    /// after the occupant depending on which half of its box holds the
    /// point, except that the last master is never split from the slave
    /// boundary: with slaves present, insertion at it always goes before.
    pub fn insert_tiled_at(&mut self, shell: &mut dyn Shell, id: ToplevelId, point: Point) {
        if self.toplevel(id).is_none() {
            return;
        }

        let workspace = self.active_workspace;
        let master_count = self.config.master_count;
        let under = self.tiled_toplevel_at(workspace, point);
        let under_box = under.and_then(|u| self.toplevel(u)).map(|tl| tl.current);

        let ws = self.workspace_mut(workspace);
        match (under, under_box) {
            (Some(under), Some(under_box)) => {
                let on_top_half = point.y <= under_box.center().y;

                if let Some(pos) = ws.masters.iter().position(|m| *m == under) {
                    let last_master = pos + 1 == ws.masters.len();
                    let before =
                        (last_master && !ws.slaves.is_empty()) || on_top_half;
                    ws.masters.insert(if before { pos } else { pos + 1 }, id);

                    if ws.masters.len() > master_count {
                        if let Some(demoted) = ws.masters.pop() {
                            ws.slaves.insert(0, demoted);
                        }
                    }
                } else if let Some(pos) = ws.slaves.iter().position(|s| *s == under) {
                    ws.slaves.insert(if on_top_half { pos } else { pos + 1 }, id);
                }
            },
            _ => {
                if ws.masters.len() < master_count {
                    ws.masters.push(id);
                } else {
                    ws.slaves.push(id);
                }
            },
        }

        debug!(toplevel = id.0, "inserted into tiled layout");

        if let Some(tl) = self.toplevel_mut(id) {
            tl.floating = false;
            tl.workspace = workspace;
        }
        shell.reparent_node(id, SceneLayer::Tiled);
        self.reflow_workspace(shell, workspace);
    }

    /// Insert a toplevel at the top of the active workspace's floating
    /// z-order.
    pub fn insert_floating(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        if self.toplevel(id).is_none() {
            return;
        }

        let workspace = self.active_workspace;
        self.workspace_mut(workspace).floating.insert(0, id);
        if let Some(tl) = self.toplevel_mut(id) {
            tl.floating = true;
            tl.workspace = workspace;
        }
        shell.reparent_node(id, SceneLayer::Floating);
    }
}
