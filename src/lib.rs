pub mod app;
pub mod capability;
pub mod config;
pub mod dream;
pub mod logging;
pub mod render;
pub mod terminal;
