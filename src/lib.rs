pub mod config;
pub mod preview;
pub mod renderer;
pub mod wayland;
