//! Shared test harness: a recording [`Shell`] stub and helpers to drive
//! the core the way the real compositor glue would.

use std::collections::HashMap;
use std::sync::Once;

use tidewm::config::Config;
use tidewm::geometry::{Point, Rect, Size};
use tidewm::wm::events::Event;
use tidewm::wm::scene::{SceneLayer, Shell};
use tidewm::wm::{OutputId, ToplevelId, WindowManager};

/// Records every side effect the core requests. Tests assert on the
/// recorded state instead of a live scene graph.
#[derive(Debug, Default)]
pub struct RecordingShell {
    pub configures: Vec<(ToplevelId, Size, u32)>,
    /// Latest unacknowledged configure per toplevel, drained by [`settle`].
    pub latest_configure: HashMap<ToplevelId, (Size, u32)>,

    pub node_layer: HashMap<ToplevelId, SceneLayer>,
    pub node_enabled: HashMap<ToplevelId, bool>,
    pub node_position: HashMap<ToplevelId, Point>,
    pub destroyed: Vec<ToplevelId>,
    pub raised: Vec<ToplevelId>,
    pub activated: HashMap<ToplevelId, bool>,
    pub keyboard_entered: Vec<ToplevelId>,
    pub under_layers: HashMap<OutputId, bool>,
    pub frames_scheduled: Vec<OutputId>,
    pub broadcasts: usize,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Shell for RecordingShell {
    fn create_node(&mut self, toplevel: ToplevelId, layer: SceneLayer) {
        self.node_layer.insert(toplevel, layer);
        self.node_enabled.insert(toplevel, true);
    }

    fn destroy_node(&mut self, toplevel: ToplevelId) {
        self.node_layer.remove(&toplevel);
        self.node_enabled.remove(&toplevel);
        self.destroyed.push(toplevel);
    }

    fn set_node_position(&mut self, toplevel: ToplevelId, position: Point) {
        self.node_position.insert(toplevel, position);
    }

    fn set_node_enabled(&mut self, toplevel: ToplevelId, enabled: bool) {
        self.node_enabled.insert(toplevel, enabled);
    }

    fn raise_node(&mut self, toplevel: ToplevelId) {
        self.raised.push(toplevel);
    }

    fn reparent_node(&mut self, toplevel: ToplevelId, layer: SceneLayer) {
        self.node_layer.insert(toplevel, layer);
    }

    fn set_under_layers_enabled(&mut self, output: OutputId, enabled: bool) {
        self.under_layers.insert(output, enabled);
    }

    fn schedule_frame(&mut self, output: OutputId) {
        self.frames_scheduled.push(output);
    }

    fn configure(&mut self, toplevel: ToplevelId, size: Size, serial: u32) {
        self.configures.push((toplevel, size, serial));
        self.latest_configure.insert(toplevel, (size, serial));
    }

    fn set_activated(&mut self, toplevel: ToplevelId, activated: bool) {
        self.activated.insert(toplevel, activated);
    }

    fn keyboard_enter(&mut self, toplevel: ToplevelId) {
        self.keyboard_entered.push(toplevel);
    }

    fn active_toplevel_changed(&mut self) {
        self.broadcasts += 1;
    }
}

/// Act as a fleet of well-behaved clients: acknowledge every outstanding
/// configure at exactly the requested size, until nothing is pending.
pub fn settle(wm: &mut WindowManager, shell: &mut RecordingShell) {
    loop {
        let pending: Vec<_> = shell.latest_configure.drain().collect();
        if pending.is_empty() {
            return;
        }
        for (id, (size, serial)) in pending {
            wm.handle_event(shell, Event::Commit { id, serial, size });
        }
    }
}

/// Route core logs to the captured test output, honoring `RUST_LOG`.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A fresh core with one 1920x1080 output whose usable area is the whole
/// output, running at about 60 Hz.
pub fn session(config: Config) -> (WindowManager, RecordingShell, OutputId) {
    init_logging();
    let mut wm = WindowManager::new(config).expect("window rules must compile");
    let shell = RecordingShell::new();
    let output = wm.add_output(
        Rect::new(0, 0, 1920, 1080),
        Rect::new(0, 0, 1920, 1080),
        16,
    );
    (wm, shell, output)
}

/// Drive a client through creation, initial commit and map.
pub fn map_client(
    wm: &mut WindowManager,
    shell: &mut RecordingShell,
    min_size: Size,
    max_size: Size,
    buffer: Size,
) -> ToplevelId {
    let id = wm
        .handle_event(shell, Event::NewToplevel { parent: None, min_size, max_size })
        .expect("toplevel creation requires an output");
    wm.handle_event(shell, Event::Commit { id, serial: 0, size: Size::default() });
    wm.handle_event(shell, Event::Map { id, size: buffer });
    id
}

/// Map an unconstrained client, which tiles by default.
pub fn map_tiled(wm: &mut WindowManager, shell: &mut RecordingShell) -> ToplevelId {
    map_client(wm, shell, Size::default(), Size::default(), Size::new(800, 600))
}
