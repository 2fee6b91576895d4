//! Event facade
//!
//! The closed set of inputs driving the core, mirroring the surface
//! lifecycle and request events of the shell protocol plus pointer and
//! frame timing. Protocol glue translates listener callbacks into these;
//! tests feed them directly.

use crate::geometry::{Point, Size};
use crate::wm::focus::Direction;
use crate::wm::moveresize::ResizeEdges;
use crate::wm::scene::Shell;
use crate::wm::{OutputId, ToplevelId, WindowManager, WorkspaceId};

#[derive(Debug, Clone)]
pub enum Event {
    /// A client created a toplevel surface.
    NewToplevel {
        parent: Option<ToplevelId>,
        min_size: Size,
        max_size: Size,
    },
    /// The client committed surface state. `serial` is the last configure
    /// it acknowledged, `size` the committed surface size.
    Commit {
        id: ToplevelId,
        serial: u32,
        size: Size,
    },
    /// The surface became mapped with a first buffer of `size`.
    Map { id: ToplevelId, size: Size },
    Unmap { id: ToplevelId },
    Destroy { id: ToplevelId },
    SetAppId { id: ToplevelId, app_id: String },
    SetTitle { id: ToplevelId, title: String },
    RequestMove { id: ToplevelId },
    RequestResize { id: ToplevelId, edges: ResizeEdges },
    RequestMaximize { id: ToplevelId },
    RequestFullscreen { id: ToplevelId, fullscreen: bool },
    PointerMotion { position: Point },
    PointerRelease,
    FrameTick { output: OutputId },
    SwitchWorkspace { workspace: WorkspaceId },
    MoveToWorkspace { id: ToplevelId, workspace: WorkspaceId },
    CycleFocus { forward: bool },
    FocusDirection { direction: Direction },
}

impl WindowManager {
    /// Apply one event. Returns the id of a newly created toplevel for
    /// [`Event::NewToplevel`], `None` otherwise.
    pub fn handle_event(&mut self, shell: &mut dyn Shell, event: Event) -> Option<ToplevelId> {
        match event {
            Event::NewToplevel { parent, min_size, max_size } => {
                return self.create_toplevel(parent, min_size, max_size);
            },
            Event::Commit { id, serial, size } => self.commit(shell, id, serial, size),
            Event::Map { id, size } => self.map_toplevel(shell, id, size),
            Event::Unmap { id } => self.unmap_toplevel(shell, id),
            Event::Destroy { id } => self.destroy_toplevel(shell, id),
            Event::SetAppId { id, app_id } => self.set_app_id(shell, id, app_id),
            Event::SetTitle { id, title } => self.set_title(shell, id, title),
            Event::RequestMove { id } => self.start_move(shell, id),
            Event::RequestResize { id, edges } => self.start_resize(shell, id, edges),
            Event::RequestMaximize { id } => self.request_maximize(shell, id),
            Event::RequestFullscreen { id, fullscreen } => {
                if fullscreen {
                    self.set_fullscreen(shell, id);
                } else {
                    self.unset_fullscreen(shell, id);
                }
            },
            Event::PointerMotion { position } => self.pointer_motion(shell, position),
            Event::PointerRelease => self.end_grab(shell),
            Event::FrameTick { output } => self.frame_tick(shell, output),
            Event::SwitchWorkspace { workspace } => self.switch_workspace(shell, workspace),
            Event::MoveToWorkspace { id, workspace } => {
                self.move_toplevel_to_workspace(shell, id, workspace);
            },
            Event::CycleFocus { forward } => self.cycle_focus(shell, forward),
            Event::FocusDirection { direction } => self.focus_floating_neighbor(shell, direction),
        }
        None
    }
}
