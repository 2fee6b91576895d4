//! tidewm: tiling and window-lifecycle core for a Wayland compositor
//!
//! This crate implements the policy layer of a master/stack tiling window
//! manager: which workspace a toplevel lives on, whether it is tiled or
//! floating, its geometry, its focus and fullscreen state, and how
//! interactive move/resize grabs manipulate it. Rendering, protocol
//! transport and input routing stay on the other side of the
//! [`wm::scene::Shell`] trait; the core itself is a single-threaded state
//! machine driven by the closed [`wm::events::Event`] set.

pub mod config;
pub mod geometry;
pub mod wm;

pub use config::Config;
pub use wm::WindowManager;
