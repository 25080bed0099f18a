pub mod animation;
pub mod commands;
pub mod config;
pub mod console_interface;
pub mod core;
pub mod error;
pub mod game_loop;
pub mod levels;
pub mod progress;
pub mod session;
#[cfg(test)]
mod test;

pub use error::{GameError, Result};
