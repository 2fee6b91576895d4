//! Toplevel entity
//!
//! One client window: identity and matching attributes, geometry in its
//! three stages (pending, current, pre-fullscreen), the flag set driving
//! the lifecycle state machine, and the animation sub-state advanced by
//! output frame ticks.
//!
//! `current` is only ever written by the commit step; geometry setters
//! write `pending` and wait for the client's acknowledgment, matched by
//! configure serial.

use crate::geometry::{Rect, Size};
use crate::wm::rules::CompiledRules;
use crate::wm::{ToplevelId, WorkspaceId};

#[derive(Debug)]
pub struct Toplevel {
    pub id: ToplevelId,

    pub app_id: Option<String>,
    pub title: Option<String>,

    /// Parent toplevel for transients/dialogs. Transients always float.
    pub parent: Option<ToplevelId>,

    /// Client-declared size constraints; zero means unconstrained.
    pub min_size: Size,
    pub max_size: Size,

    pub mapped: bool,

    /// The first commit configures the client before it can map.
    pub initial_commit_done: bool,

    pub floating: bool,
    pub fullscreen: bool,

    /// Set while an interactive resize streams geometry; commits apply
    /// immediately without serial matching.
    pub resizing: bool,

    /// A geometry change was requested and not yet acknowledged.
    pub dirty: bool,

    /// Requested geometry awaiting client acknowledgment.
    pub pending: Rect,

    /// Last acknowledged/applied geometry.
    pub current: Rect,

    /// Geometry saved when entering fullscreen, restored on leave.
    pub prev_geometry: Rect,

    /// Serial of the last geometry configure; older acknowledgments are
    /// stale and must be dropped.
    pub configure_serial: u32,

    pub animation: Animation,

    pub active_opacity: f32,
    pub inactive_opacity: f32,

    /// Owning workspace (non-owning handle).
    pub workspace: WorkspaceId,
}

impl Toplevel {
    pub fn new(
        id: ToplevelId,
        workspace: WorkspaceId,
        parent: Option<ToplevelId>,
        min_size: Size,
        max_size: Size,
        active_opacity: f32,
        inactive_opacity: f32,
    ) -> Self {
        Self {
            id,
            app_id: None,
            title: None,
            parent,
            min_size,
            max_size,
            mapped: false,
            initial_commit_done: false,
            floating: false,
            fullscreen: false,
            resizing: false,
            dirty: false,
            pending: Rect::default(),
            current: Rect::default(),
            prev_geometry: Rect::default(),
            configure_serial: 0,
            animation: Animation::default(),
            active_opacity,
            inactive_opacity,
            workspace,
        }
    }

    /// A toplevel floats if the client pinned its size on either axis,
    /// if it is a transient of another toplevel, or if a float rule
    /// matches it. Tiling is the default.
    pub fn should_float(&self, rules: &CompiledRules) -> bool {
        let fixed_width = self.max_size.width != 0 && self.max_size.width == self.min_size.width;
        let fixed_height =
            self.max_size.height != 0 && self.max_size.height == self.min_size.height;
        if fixed_width || fixed_height || self.parent.is_some() {
            return true;
        }

        rules.matches_float(self.app_id.as_deref(), self.title.as_deref())
    }

    pub fn opacity(&self, focused: bool) -> f32 {
        if focused { self.active_opacity } else { self.inactive_opacity }
    }

    /// The box the renderer should draw right now: the animated box while
    /// an animation runs, the committed geometry otherwise.
    pub fn visible_geometry(&self) -> Rect {
        if self.animation.running { self.animation.current } else { self.current }
    }
}

/// Geometry-transition animation state.
///
/// `should_animate` is latched by the geometry setter and consumed by the
/// commit step, which arms `running`; per-output frame ticks then advance
/// `passed_frames` and interpolate `current` between `initial` and the
/// committed geometry.
#[derive(Debug, Default, Clone, Copy)]
pub struct Animation {
    pub should_animate: bool,
    pub running: bool,
    pub initial: Rect,
    pub current: Rect,
    pub passed_frames: u32,
    pub total_frames: u32,
}

impl Animation {
    /// Advance by one frame towards `target`, returning whether the
    /// animation is still running afterwards.
    pub fn tick(&mut self, target: Rect) -> bool {
        if !self.running {
            return false;
        }

        self.passed_frames += 1;
        if self.passed_frames >= self.total_frames {
            self.current = target;
            self.running = false;
            return false;
        }

        let t = self.passed_frames as f64 / self.total_frames as f64;
        self.current = Rect::interpolate(self.initial, target, t);
        true
    }
}
