//! Focus & activation
//!
//! At most one toplevel holds focus system-wide. Focus changes are policy
//! no-ops while the session is locked, an exclusive-input client holds
//! input, a grab is in progress, or a foreign fullscreen toplevel owns
//! the workspace. Every change of the focus holder, including to none,
//! broadcasts the active-toplevel notification.

use tracing::debug;

use crate::wm::scene::Shell;
use crate::wm::workspace::Role;
use crate::wm::{ToplevelId, WindowManager, WorkspaceId};

/// Cardinal direction for directional floating focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl WindowManager {
    /// Move focus to the toplevel, deactivating the previous holder and
    /// raising a floating target to the top of its z-order.
    pub fn focus_toplevel(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        if self.session_locked || self.exclusive_input {
            debug!(toplevel = id.0, "focus rejected, input is restricted");
            return;
        }
        if self.grab.is_active() {
            debug!(toplevel = id.0, "focus rejected, grab in progress");
            return;
        }
        let Some(tl) = self.toplevel(id) else { return };
        if !tl.mapped {
            return;
        }
        let workspace = tl.workspace;
        let floating = tl.floating;

        let ws_fullscreen = self.workspace(workspace).fullscreen;
        if ws_fullscreen.is_some() && ws_fullscreen != Some(id) {
            debug!(toplevel = id.0, "focus rejected, workspace is fullscreen");
            return;
        }
        if self.focused == Some(id) {
            return;
        }

        if let Some(prev) = self.focused {
            shell.set_activated(prev, false);
        }
        self.focused = Some(id);

        if floating {
            let ws = self.workspace_mut(workspace);
            ws.floating.retain(|other| *other != id);
            ws.floating.insert(0, id);
        }

        shell.set_activated(id, true);
        shell.raise_node(id);
        shell.keyboard_enter(id);
        shell.active_toplevel_changed();

        // Borders need a redraw.
        let output = self.workspace(workspace).output;
        shell.schedule_frame(output);
    }

    /// Clear focus to none and notify subscribers.
    pub fn unfocus(&mut self, shell: &mut dyn Shell) {
        let Some(id) = self.focused.take() else { return };
        shell.set_activated(id, false);
        shell.active_toplevel_changed();

        if let Some(tl) = self.toplevel(id) {
            let output = self.workspace(tl.workspace).output;
            shell.schedule_frame(output);
        }
    }

    /// Focus successor when the focused member is removed: next in its
    /// list, else previous, else the role-specific fallback. A slave
    /// always finds the last master, since master slots stay filled while
    /// any slave exists.
    pub(crate) fn removal_successor(
        &self,
        workspace: WorkspaceId,
        role: Role,
        removed: ToplevelId,
    ) -> Option<ToplevelId> {
        let ws = self.workspace(workspace);
        let neighbor = |list: &[ToplevelId]| -> Option<ToplevelId> {
            let pos = list.iter().position(|id| *id == removed)?;
            if pos + 1 < list.len() {
                Some(list[pos + 1])
            } else if pos > 0 {
                Some(list[pos - 1])
            } else {
                None
            }
        };

        match role {
            Role::Floating => neighbor(&ws.floating).or_else(|| ws.masters.first().copied()),
            Role::Master => neighbor(&ws.masters).or_else(|| ws.floating.first().copied()),
            Role::Slave => neighbor(&ws.slaves).or_else(|| ws.masters.last().copied()),
        }
    }

    /// Cycle focus over the active workspace's members in master, slave,
    /// floating order.
    pub fn cycle_focus(&mut self, shell: &mut dyn Shell, forward: bool) {
        let ring: Vec<ToplevelId> = self.workspace(self.active_workspace).members().collect();
        if ring.is_empty() {
            return;
        }

        let next = match self.focused.and_then(|f| ring.iter().position(|id| *id == f)) {
            None => ring[0],
            Some(pos) => {
                let len = ring.len();
                if forward { ring[(pos + 1) % len] } else { ring[(pos + len - 1) % len] }
            },
        };
        self.focus_toplevel(shell, next);
    }

    /// Focus the nearest floating neighbour of the focused toplevel in
    /// the given direction, measured by axis distance.
    pub fn focus_floating_neighbor(&mut self, shell: &mut dyn Shell, direction: Direction) {
        let Some(focused) = self.focused else { return };
        let Some(tl) = self.toplevel(focused) else { return };
        if !tl.floating {
            return;
        }

        if let Some(neighbor) = self.closest_floating(focused, direction) {
            self.focus_toplevel(shell, neighbor);
        }
    }

    fn closest_floating(&self, from: ToplevelId, direction: Direction) -> Option<ToplevelId> {
        let tl = self.toplevel(from)?;
        let origin = tl.current.position();
        let ws = self.workspace(tl.workspace);

        let mut best: Option<(ToplevelId, i32)> = None;
        for other in ws.floating.iter().copied().filter(|other| *other != from) {
            let Some(other_tl) = self.toplevel(other) else { continue };
            let position = other_tl.current.position();

            let distance = match direction {
                Direction::Up if position.y <= origin.y => origin.y - position.y,
                Direction::Down if position.y >= origin.y => position.y - origin.y,
                Direction::Left if position.x <= origin.x => origin.x - position.x,
                Direction::Right if position.x >= origin.x => position.x - origin.x,
                _ => continue,
            };

            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((other, distance));
            }
        }
        best.map(|(id, _)| id)
    }
}
