//! Shell collaborator boundary
//!
//! Everything the core needs from the embedding compositor: scene-graph
//! node management, shell-layer visibility, frame scheduling, client
//! messaging and the active-toplevel IPC broadcast. Implemented by the
//! real scene/protocol glue in production and by a recording stub in
//! tests.

use crate::geometry::{Point, Size};
use crate::wm::{OutputId, ToplevelId};

/// Named scene layers a toplevel's node can be parented to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneLayer {
    Tiled,
    Floating,
    Fullscreen,
}

pub trait Shell {
    /// Create a displayable node for a newly mapped toplevel.
    fn create_node(&mut self, toplevel: ToplevelId, layer: SceneLayer);

    /// Destroy a toplevel's node. Called once the toplevel is unmapped.
    fn destroy_node(&mut self, toplevel: ToplevelId);

    fn set_node_position(&mut self, toplevel: ToplevelId, position: Point);

    fn set_node_enabled(&mut self, toplevel: ToplevelId, enabled: bool);

    fn raise_node(&mut self, toplevel: ToplevelId);

    fn reparent_node(&mut self, toplevel: ToplevelId, layer: SceneLayer);

    /// Toggle the top/bottom shell layers on an output. The background
    /// layer is never touched; fullscreen presentation hides the rest.
    fn set_under_layers_enabled(&mut self, output: OutputId, enabled: bool);

    fn schedule_frame(&mut self, output: OutputId);

    /// Send a configure for a new size. `serial` is the request token the
    /// client must eventually acknowledge; see [`crate::wm::events::Event::Commit`].
    fn configure(&mut self, toplevel: ToplevelId, size: Size, serial: u32);

    /// Tell the client whether it is the activated (focused) toplevel.
    fn set_activated(&mut self, toplevel: ToplevelId, activated: bool);

    /// Move keyboard focus to the toplevel's surface, reporting currently
    /// pressed keys to it.
    fn keyboard_enter(&mut self, toplevel: ToplevelId);

    /// Broadcast that the active toplevel changed (possibly to none).
    /// Subscribers query current focus themselves; there is no payload.
    fn active_toplevel_changed(&mut self);
}
