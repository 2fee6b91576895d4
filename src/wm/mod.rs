//! Window Manager Module
//!
//! The policy core: who lives where, who is focused, who is fullscreen,
//! and what geometry everyone gets. All state lives behind plain handle
//! types into [`WindowManager`]-owned storage; external effects go
//! through the [`scene::Shell`] trait. Everything runs to completion on
//! one control thread in response to discrete events.

pub mod events;
pub mod focus;
pub mod fullscreen;
pub mod layout;
pub mod moveresize;
pub mod output;
pub mod rules;
pub mod scene;
pub mod toplevel;
pub mod workspace;

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::geometry::{Rect, Size};
use crate::wm::moveresize::GrabState;
use crate::wm::output::Output;
use crate::wm::rules::{CompiledRules, RuleError};
use crate::wm::scene::{SceneLayer, Shell};
use crate::wm::toplevel::Toplevel;
use crate::wm::workspace::{Role, Workspace};

/// Handle to a toplevel. Allocated from a monotonic counter and never
/// reused, so a stale handle misses instead of aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToplevelId(pub u64);

/// Handle to a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkspaceId(pub u32);

/// Handle to an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(pub u32);

/// The whole window-manager state: entity registry, per-workspace
/// membership, and the process-wide session singletons (focus holder,
/// active grab, lock/exclusive flags). Reset by constructing a new value
/// at session start; mutated only through the operations in this module
/// tree.
pub struct WindowManager {
    pub(crate) config: Config,
    pub(crate) rules: CompiledRules,

    toplevels: HashMap<ToplevelId, Toplevel>,
    workspaces: Vec<Workspace>,
    outputs: Vec<Output>,

    pub(crate) active_workspace: WorkspaceId,
    pub(crate) focused: Option<ToplevelId>,

    /// Focus holder to restore when the current grab ends.
    pub(crate) prev_focused: Option<ToplevelId>,

    pub(crate) grab: GrabState,

    pub(crate) session_locked: bool,
    pub(crate) exclusive_input: bool,

    pub(crate) cursor: crate::geometry::Point,

    next_toplevel_id: u64,
    serial_counter: u32,
}

impl WindowManager {
    pub fn new(config: Config) -> Result<Self, RuleError> {
        let config = config.sanitized();
        let rules = CompiledRules::compile(&config.rules)?;
        Ok(Self {
            config,
            rules,
            toplevels: HashMap::new(),
            workspaces: Vec::new(),
            outputs: Vec::new(),
            active_workspace: WorkspaceId(0),
            focused: None,
            prev_focused: None,
            grab: GrabState::Idle,
            session_locked: false,
            exclusive_input: false,
            cursor: crate::geometry::Point::default(),
            next_toplevel_id: 0,
            serial_counter: 0,
        })
    }

    // ------------------------------------------------------------------
    // Registry access

    pub fn toplevel(&self, id: ToplevelId) -> Option<&Toplevel> {
        self.toplevels.get(&id)
    }

    pub(crate) fn toplevel_mut(&mut self, id: ToplevelId) -> Option<&mut Toplevel> {
        self.toplevels.get_mut(&id)
    }

    pub fn workspace(&self, id: WorkspaceId) -> &Workspace {
        &self.workspaces[id.0 as usize]
    }

    pub(crate) fn workspace_mut(&mut self, id: WorkspaceId) -> &mut Workspace {
        &mut self.workspaces[id.0 as usize]
    }

    pub fn output(&self, id: OutputId) -> &Output {
        &self.outputs[id.0 as usize]
    }

    pub fn active_workspace(&self) -> WorkspaceId {
        self.active_workspace
    }

    pub fn focused(&self) -> Option<ToplevelId> {
        self.focused
    }

    pub fn grab(&self) -> &GrabState {
        &self.grab
    }

    pub fn set_session_locked(&mut self, locked: bool) {
        self.session_locked = locked;
    }

    pub fn set_exclusive_input(&mut self, exclusive: bool) {
        self.exclusive_input = exclusive;
    }

    pub(crate) fn next_serial(&mut self) -> u32 {
        self.serial_counter += 1;
        self.serial_counter
    }

    // ------------------------------------------------------------------
    // Outputs and workspaces

    /// Register an output and create its workspaces. The first workspace
    /// of the first output becomes the active one.
    pub fn add_output(
        &mut self,
        geometry: Rect,
        usable_area: Rect,
        frame_duration_ms: u32,
    ) -> OutputId {
        let output_id = OutputId(self.outputs.len() as u32);
        let mut output = Output::new(geometry, usable_area, frame_duration_ms);

        for _ in 0..self.config.workspaces_per_output {
            let workspace_id = WorkspaceId(self.workspaces.len() as u32);
            self.workspaces.push(Workspace::new(output_id));
            output.workspaces.push(workspace_id);
        }

        if output_id.0 == 0 {
            self.active_workspace = output.workspaces[0];
        }

        info!(
            output = output_id.0,
            workspaces = output.workspaces.len(),
            "output added"
        );
        self.outputs.push(output);
        output_id
    }

    /// Update an output's usable area (shell surfaces changed their
    /// reserved space) and reflow its workspaces.
    pub fn set_usable_area(&mut self, shell: &mut dyn Shell, output: OutputId, usable_area: Rect) {
        if output.0 as usize >= self.outputs.len() {
            return;
        }
        self.outputs[output.0 as usize].usable_area = usable_area;
        let workspaces = self.outputs[output.0 as usize].workspaces.clone();
        for workspace in workspaces {
            self.reflow_workspace(shell, workspace);
        }
        shell.schedule_frame(output);
    }

    // ------------------------------------------------------------------
    // Toplevel lifecycle

    /// A client created a toplevel surface. It starts unmapped, without
    /// geometry, on the active workspace with the default opacity pair.
    pub fn create_toplevel(
        &mut self,
        parent: Option<ToplevelId>,
        min_size: Size,
        max_size: Size,
    ) -> Option<ToplevelId> {
        if self.workspaces.is_empty() {
            warn!("toplevel created before any output exists, ignoring");
            return None;
        }

        self.next_toplevel_id += 1;
        let id = ToplevelId(self.next_toplevel_id);
        let toplevel = Toplevel::new(
            id,
            self.active_workspace,
            parent,
            min_size,
            max_size,
            self.config.active_opacity,
            self.config.inactive_opacity,
        );
        debug!(toplevel = id.0, "toplevel created");
        self.toplevels.insert(id, toplevel);
        Some(id)
    }

    /// A new surface state was committed. The first commit triggers the
    /// initial configure; later ones apply pending geometry, gated by the
    /// acknowledgment serial so a stale ack can never regress `current`.
    pub fn commit(&mut self, shell: &mut dyn Shell, id: ToplevelId, serial: u32, size: Size) {
        let Some(tl) = self.toplevel(id) else { return };

        if !tl.initial_commit_done {
            self.initial_commit(shell, id);
            return;
        }

        if tl.resizing {
            self.commit_geometry(shell, id);
            return;
        }

        if !tl.dirty || serial < tl.configure_serial {
            return;
        }

        if tl.floating && !tl.fullscreen && tl.pending.width == 0 {
            // Client kept its own size; adopt it.
            if let Some(tl) = self.toplevel_mut(id) {
                tl.pending.width = size.width;
                tl.pending.height = size.height;
            }
        }

        self.commit_geometry(shell, id);
    }

    /// Reply to the initial commit with a configure so the client can
    /// map: floating toplevels get their rule size (or pick their own),
    /// tiled ones the dimensions they will occupy once inserted.
    fn initial_commit(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        let Some(tl) = self.toplevel(id) else { return };
        let workspace = self.workspace(tl.workspace);
        let usable_area = self.output(workspace.output).usable_area;

        let floating = tl.should_float(&self.rules);
        let size = if floating {
            self.rules
                .floating_size(tl.app_id.as_deref(), tl.title.as_deref(), usable_area)
                .unwrap_or_default()
        } else if workspace.masters.len() < self.config.master_count {
            layout::master_dimensions(
                usable_area,
                workspace.masters.len() + 1,
                workspace.slaves.len(),
            )
        } else {
            layout::slave_dimensions(usable_area, workspace.slaves.len() + 1)
        };

        let serial = self.next_serial();
        if let Some(tl) = self.toplevel_mut(id) {
            tl.floating = floating;
            tl.initial_commit_done = true;
            tl.configure_serial = serial;
            tl.pending.width = size.width;
            tl.pending.height = size.height;
        }
        debug!(toplevel = id.0, floating, "initial configure");
        shell.configure(id, size, serial);
    }

    /// The surface is mapped and ready to display. `size` is the size of
    /// the first committed buffer, used when the client chose its own.
    pub fn map_toplevel(&mut self, shell: &mut dyn Shell, id: ToplevelId, size: Size) {
        let Some(tl) = self.toplevel(id) else { return };
        if tl.mapped {
            return;
        }
        if !tl.initial_commit_done {
            self.initial_commit(shell, id);
        }

        let Some(tl) = self.toplevel(id) else { return };
        let workspace = tl.workspace;
        let floating = tl.floating;
        let output = self.workspace(workspace).output;
        let usable_area = self.output(output).usable_area;
        let master_count = self.config.master_count;

        if floating {
            self.workspace_mut(workspace).floating.insert(0, id);
            shell.create_node(id, SceneLayer::Floating);
        } else {
            let ws = self.workspace_mut(workspace);
            if ws.masters.len() < master_count {
                ws.masters.push(id);
            } else {
                ws.slaves.push(id);
            }
            shell.create_node(id, SceneLayer::Tiled);
        }

        if let Some(tl) = self.toplevel_mut(id) {
            tl.mapped = true;
        }
        info!(toplevel = id.0, floating, "toplevel mapped");

        if !floating {
            self.reflow_workspace(shell, workspace);
        }

        // Park the node on its own output until the first commit places
        // it, so it does not flash at the layout origin.
        shell.set_node_position(id, usable_area.position());

        // Mapping below an active fullscreen toplevel must not show
        // through it. Known-fragile interaction for clients that expect
        // to be visible immediately.
        if self.workspace(workspace).fullscreen.is_some() {
            shell.set_node_enabled(id, false);
        }

        self.focus_toplevel(shell, id);

        if floating {
            if let Some(tl) = self.toplevel_mut(id) {
                if tl.pending.width == 0 {
                    tl.pending.width = size.width.max(1);
                    tl.pending.height = size.height.max(1);
                }
                tl.pending.x =
                    usable_area.x + (usable_area.width as i32 - tl.pending.width as i32) / 2;
                tl.pending.y =
                    usable_area.y + (usable_area.height as i32 - tl.pending.height as i32) / 2;
            }
        }

        // Newly mapped toplevels grow from a one-pixel box at the center
        // of their target geometry, tiled and floating alike.
        if self.config.animations {
            if let Some(tl) = self.toplevel_mut(id) {
                let center = tl.pending.center();
                tl.animation.should_animate = true;
                tl.animation.initial = Rect::new(center.x, center.y, 1, 1);
            }
        }

        if floating {
            self.commit_geometry(shell, id);
        }
    }

    /// The surface was unmapped. Membership, fullscreen, grab and focus
    /// references are all released here; the entity itself survives until
    /// destroy.
    pub fn unmap_toplevel(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        let Some(tl) = self.toplevel(id) else { return };
        if !tl.mapped {
            return;
        }
        let workspace = tl.workspace;
        let was_floating = tl.floating;
        info!(toplevel = id.0, "toplevel unmapped");

        if self.prev_focused == Some(id) {
            self.prev_focused = None;
        }

        // A grabbed toplevel is in no list; drop the grab and hand focus
        // to the first floating, else the first master.
        if self.grab.toplevel() == Some(id) {
            self.grab = GrabState::Idle;

            let ws = self.workspace(workspace);
            let next = if was_floating { ws.floating.first().copied() } else { None }
                .or_else(|| self.workspace(workspace).masters.first().copied());
            match next {
                Some(next) => self.focus_toplevel(shell, next),
                None if self.focused == Some(id) => self.unfocus(shell),
                None => {},
            }

            if let Some(tl) = self.toplevel_mut(id) {
                tl.mapped = false;
            }
            shell.destroy_node(id);
            return;
        }

        if self.workspace(workspace).fullscreen == Some(id) {
            self.workspace_mut(workspace).fullscreen = None;
            let output = self.workspace(workspace).output;
            shell.set_under_layers_enabled(output, true);
            let siblings: Vec<_> =
                self.workspace(workspace).members().filter(|m| *m != id).collect();
            for sibling in siblings {
                shell.set_node_enabled(sibling, true);
            }
        }

        let Some(role) = self.workspace(workspace).role_of(id) else {
            if let Some(tl) = self.toplevel_mut(id) {
                tl.mapped = false;
            }
            shell.destroy_node(id);
            return;
        };

        // Fill a master vacancy from the slaves before picking the focus
        // successor, so the promoted slave is a candidate.
        if role == Role::Master && !self.workspace(workspace).slaves.is_empty() {
            let ws = self.workspace_mut(workspace);
            let promoted = ws.slaves.remove(0);
            ws.masters.push(promoted);
        }

        let successor = if self.focused == Some(id) {
            self.removal_successor(workspace, role, id)
        } else {
            None
        };

        self.workspace_mut(workspace).remove(id);
        if let Some(tl) = self.toplevel_mut(id) {
            tl.mapped = false;
        }

        if self.focused == Some(id) {
            match successor {
                Some(next) => self.focus_toplevel(shell, next),
                None => self.unfocus(shell),
            }
        }

        shell.destroy_node(id);

        if role != Role::Floating {
            self.reflow_workspace(shell, workspace);
        }
    }

    /// The client destroyed the surface. Every external registration the
    /// entity still holds is released before it is dropped.
    pub fn destroy_toplevel(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        let Some(tl) = self.toplevel(id) else { return };
        let workspace = tl.workspace;
        if tl.mapped {
            self.unmap_toplevel(shell, id);
        }

        if self.prev_focused == Some(id) {
            self.prev_focused = None;
        }
        if self.grab.toplevel() == Some(id) {
            self.grab = GrabState::Idle;
        }
        if self.focused == Some(id) {
            self.unfocus(shell);
        }
        if self.workspace(workspace).fullscreen == Some(id) {
            self.workspace_mut(workspace).fullscreen = None;
        }
        self.workspace_mut(workspace).remove(id);
        self.toplevels.remove(&id);
        debug!(toplevel = id.0, "toplevel destroyed");
    }

    // ------------------------------------------------------------------
    // Metadata

    pub fn set_app_id(&mut self, shell: &mut dyn Shell, id: ToplevelId, app_id: String) {
        if let Some(tl) = self.toplevel_mut(id) {
            tl.app_id = Some(app_id);
        } else {
            return;
        }
        self.recheck_opacity_rules(shell, id);
    }

    pub fn set_title(&mut self, shell: &mut dyn Shell, id: ToplevelId, title: String) {
        if let Some(tl) = self.toplevel_mut(id) {
            tl.title = Some(title);
        } else {
            return;
        }
        self.recheck_opacity_rules(shell, id);
    }

    /// Identifying attributes changed; re-resolve the opacity pair and
    /// let subscribers re-query the active toplevel.
    fn recheck_opacity_rules(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        let Some(tl) = self.toplevel(id) else { return };
        let defaults = (self.config.active_opacity, self.config.inactive_opacity);
        let (active, inactive) =
            self.rules.opacity(tl.app_id.as_deref(), tl.title.as_deref(), defaults);
        if let Some(tl) = self.toplevel_mut(id) {
            tl.active_opacity = active;
            tl.inactive_opacity = inactive;
        }
        if self.focused == Some(id) {
            shell.active_toplevel_changed();
        }
    }

    /// Maximization is not supported, but the request must still be
    /// answered with a configure once the surface is initialized.
    pub fn request_maximize(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        let Some(tl) = self.toplevel(id) else { return };
        if !tl.initial_commit_done {
            return;
        }
        let serial = self.next_serial();
        shell.configure(id, Size::default(), serial);
    }

    // ------------------------------------------------------------------
    // Geometry

    /// Request new geometry. Writes `pending` only; `current` changes
    /// when the client's acknowledgment comes back through [`Self::commit`].
    /// Returns the request token, or `None` when the size is unchanged
    /// and the move applied immediately.
    pub fn set_pending_geometry(
        &mut self,
        shell: &mut dyn Shell,
        id: ToplevelId,
        rect: Rect,
    ) -> Option<u32> {
        let grabbed = self.grab.toplevel() == Some(id);
        let animations = self.config.animations;

        let needs_configure = {
            let tl = self.toplevel_mut(id)?;
            tl.pending = rect;
            if !animations || grabbed || tl.current == rect {
                tl.animation.should_animate = false;
            } else {
                tl.animation.should_animate = true;
                tl.animation.initial = tl.current;
            }
            tl.current.size() != rect.size()
        };

        if !needs_configure {
            // Pure move, nothing for the client to acknowledge.
            self.commit_geometry(shell, id);
            return None;
        }

        let serial = self.next_serial();
        if let Some(tl) = self.toplevel_mut(id) {
            tl.configure_serial = serial;
            tl.dirty = true;
        }
        shell.configure(id, rect.size(), serial);
        Some(serial)
    }

    /// The commit step: the only writer of `current`. Arms the animation
    /// latched by the geometry setter.
    pub(crate) fn commit_geometry(&mut self, shell: &mut dyn Shell, id: ToplevelId) {
        let Some(tl) = self.toplevel(id) else { return };
        let workspace = tl.workspace;
        let output = self.workspace(workspace).output;
        let frame_duration = self.output(output).frame_duration_ms;
        let duration = self.config.animation_duration_ms;

        if let Some(tl) = self.toplevel_mut(id) {
            tl.dirty = false;
            tl.current = tl.pending;

            if tl.animation.should_animate {
                if tl.animation.running {
                    // Retarget a running animation from where it is now.
                    tl.animation.initial = tl.animation.current;
                }
                tl.animation.passed_frames = 0;
                tl.animation.total_frames = (duration / frame_duration).max(1);
                tl.animation.current = tl.animation.initial;
                tl.animation.running = true;
                tl.animation.should_animate = false;
                shell.set_node_position(id, tl.animation.current.position());
            } else {
                shell.set_node_position(id, tl.current.position());
            }
        }

        shell.schedule_frame(output);
    }

    /// Per-output frame tick: advance running animations and keep frames
    /// scheduled while any remain.
    pub fn frame_tick(&mut self, shell: &mut dyn Shell, output: OutputId) {
        if output.0 as usize >= self.outputs.len() {
            return;
        }
        let members: Vec<ToplevelId> = self.outputs[output.0 as usize]
            .workspaces
            .iter()
            .flat_map(|ws| self.workspace(*ws).members().collect::<Vec<_>>())
            .collect();

        let mut any_running = false;
        for id in members {
            let Some(tl) = self.toplevel_mut(id) else { continue };
            if !tl.animation.running {
                continue;
            }
            let target = tl.current;
            let still_running = tl.animation.tick(target);
            let position = tl.visible_geometry().position();
            shell.set_node_position(id, position);
            any_running |= still_running;
        }

        if any_running {
            shell.schedule_frame(output);
        }
    }

    // ------------------------------------------------------------------
    // Workspace operations

    /// Switch the active workspace: hide the outgoing members, show the
    /// incoming ones (respecting fullscreen), move focus.
    pub fn switch_workspace(&mut self, shell: &mut dyn Shell, workspace: WorkspaceId) {
        if workspace == self.active_workspace || workspace.0 as usize >= self.workspaces.len() {
            return;
        }
        info!(workspace = workspace.0, "switching workspace");

        let outgoing: Vec<_> = self.workspace(self.active_workspace).members().collect();
        for id in outgoing {
            shell.set_node_enabled(id, false);
        }

        let fullscreen = self.workspace(workspace).fullscreen;
        let incoming: Vec<_> = self.workspace(workspace).members().collect();
        for id in incoming {
            shell.set_node_enabled(id, fullscreen.is_none() || fullscreen == Some(id));
        }
        let output = self.workspace(workspace).output;
        shell.set_under_layers_enabled(output, fullscreen.is_none());

        self.active_workspace = workspace;

        let ws = self.workspace(workspace);
        let next = fullscreen
            .or_else(|| ws.masters.first().copied())
            .or_else(|| ws.floating.first().copied());
        match next {
            Some(id) => self.focus_toplevel(shell, id),
            None => self.unfocus(shell),
        }
    }

    /// Move a toplevel to another workspace: removal policy on the
    /// source, append policy on the target.
    pub fn move_toplevel_to_workspace(
        &mut self,
        shell: &mut dyn Shell,
        id: ToplevelId,
        target: WorkspaceId,
    ) {
        if target.0 as usize >= self.workspaces.len() {
            return;
        }
        let Some(tl) = self.toplevel(id) else { return };
        if !tl.mapped || tl.workspace == target || self.grab.toplevel() == Some(id) {
            return;
        }
        let source = tl.workspace;

        if self.workspace(source).fullscreen == Some(id) {
            self.unset_fullscreen(shell, id);
        }

        let Some(role) = self.workspace(source).role_of(id) else { return };

        if role == Role::Master && !self.workspace(source).slaves.is_empty() {
            let ws = self.workspace_mut(source);
            let promoted = ws.slaves.remove(0);
            ws.masters.push(promoted);
        }

        let leaving_view = target != self.active_workspace;
        let successor = if self.focused == Some(id) && leaving_view {
            self.removal_successor(source, role, id)
        } else {
            None
        };

        self.workspace_mut(source).remove(id);

        if self.focused == Some(id) && leaving_view {
            match successor {
                Some(next) => self.focus_toplevel(shell, next),
                None => self.unfocus(shell),
            }
        }

        let master_count = self.config.master_count;
        let target_ws = self.workspace_mut(target);
        if role == Role::Floating {
            target_ws.floating.insert(0, id);
        } else if target_ws.masters.len() < master_count {
            target_ws.masters.push(id);
        } else {
            target_ws.slaves.push(id);
        }
        if let Some(tl) = self.toplevel_mut(id) {
            tl.workspace = target;
        }

        let visible = !leaving_view && self.workspace(target).fullscreen.is_none();
        shell.set_node_enabled(id, visible);

        if role != Role::Floating {
            self.reflow_workspace(shell, source);
            self.reflow_workspace(shell, target);
        }
        debug!(toplevel = id.0, workspace = target.0, "toplevel moved to workspace");
    }
}
