// src/lib.rs
// Library interface for webwhisper
pub mod cli;
pub mod config;
pub mod crtsh;
pub mod normalize;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod stats;
pub mod store;
pub mod types;
pub mod verify;
