pub mod bridge;
pub mod config;
pub mod dmi;
pub mod drivers;
pub mod input;
pub mod watcher;
