pub mod config;
pub mod preset;
pub mod sound;
pub mod stats;
pub mod theme;
pub mod timer;
