//! 宿主命令模块

pub mod session_cmd;

pub use session_cmd::{execute, CommandOutcome, HostCommand, HELP};
