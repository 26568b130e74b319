//! dbot CLI library: argument parsing, the demo handler set, and offline replay.

pub mod cli;
pub mod console_bot;
pub mod demo;
pub mod replay;

pub use cli::{load_config, Cli, Commands};
pub use console_bot::ConsoleBot;
pub use demo::demo_handlers;
pub use replay::{parse_updates, read_updates, replay};
