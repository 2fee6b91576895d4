//! Per-workspace exclusive fullscreen
//!
//! One toplevel per workspace may present fullscreen. Entering saves the
//! committed geometry, targets the full output box (fullscreen ignores
//! reserved shell space), and hides every sibling plus the top/bottom
//! shell layers. Leaving restores everything; a tiled leaver forces a
//! reflow since membership changes were suppressed while fullscreen.

use tracing::{debug, info};

use crate::wm::scene::{SceneLayer, Shell};
use crate::wm::{ToplevelId, WindowManager};

impl WindowManager {
    pub fn set_fullscreen(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        let Some(tl) = self.toplevel(id) else { return };
        if !tl.mapped {
            debug!(toplevel = id.0, "fullscreen rejected, not mapped");
            return;
        }
        let workspace = tl.workspace;
        if self.workspace(workspace).fullscreen.is_some() {
            debug!(toplevel = id.0, "fullscreen rejected, workspace already fullscreen");
            return;
        }
        if self.grab.toplevel() == Some(id) {
            debug!(toplevel = id.0, "fullscreen rejected, toplevel is grabbed");
            return;
        }

        let output = self.workspace(workspace).output;
        let output_box = self.output(output).geometry;
        let current = tl.current;

        if let Some(tl) = self.toplevel_mut(id) {
            tl.prev_geometry = current;
            tl.fullscreen = true;
        }
        self.workspace_mut(workspace).fullscreen = Some(id);

        self.set_pending_geometry(shell, id, output_box);
        shell.reparent_node(id, SceneLayer::Fullscreen);

        // Siblings would show through a transparent fullscreen surface.
        let siblings: Vec<_> =
            self.workspace(workspace).members().filter(|member| *member != id).collect();
        for sibling in siblings {
            shell.set_node_enabled(sibling, false);
        }

        // Top and bottom shell layers disappear; the background stays.
        shell.set_under_layers_enabled(output, false);
        info!(toplevel = id.0, "fullscreen set");
    }

    pub fn unset_fullscreen(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        let Some(tl) = self.toplevel(id) else { return };
        let workspace = tl.workspace;
        if self.workspace(workspace).fullscreen != Some(id) {
            return;
        }
        let floating = tl.floating;
        let prev_geometry = tl.prev_geometry;

        self.workspace_mut(workspace).fullscreen = None;
        if let Some(tl) = self.toplevel_mut(id) {
            tl.fullscreen = false;
        }

        if floating {
            self.set_pending_geometry(shell, id, prev_geometry);
            shell.reparent_node(id, SceneLayer::Floating);
        } else {
            shell.reparent_node(id, SceneLayer::Tiled);
        }

        let siblings: Vec<_> =
            self.workspace(workspace).members().filter(|member| *member != id).collect();
        for sibling in siblings {
            shell.set_node_enabled(sibling, true);
        }

        let output = self.workspace(workspace).output;
        shell.set_under_layers_enabled(output, true);

        if !floating {
            // Its slot may have shifted while reflows were suppressed.
            self.reflow_workspace(shell, workspace);
        }
        info!(toplevel = id.0, "fullscreen unset");
    }
}
