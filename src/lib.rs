//! Line-following robot simulator.
//!
//! The simulation core (`sensors`, `policy`, `kinematics`, `simulation`, `scheduler`)
//! is independent of the window; `app` and `render` wrap it in a macroquad shell.

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod kinematics;
pub mod logging;
pub mod policy;
pub mod program;
pub mod render;
pub mod scheduler;
pub mod sensors;
pub mod simulation;
pub mod track;
pub mod types;
