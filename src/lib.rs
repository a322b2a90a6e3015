//! SerialCast - 多会话串口终端
//!
//! 会话引擎：连接状态机、后台读线程、事件通道、按连接名持久化的命令历史，
//! 以及管理多个会话和端口发现的会话管理器。界面只通过会话方法和取出的事件驱动它。

pub mod commands;
pub mod config;
pub mod history;
pub mod logger;
pub mod terminal;
pub mod transport;

// 重新导出常用类型
pub use config::AppConfig;
pub use history::{HistoryDirection, HistoryStore};
pub use terminal::{
    EventKind, SerialError, SerialSession, SerialSessionManager, SessionEvent, SessionState,
};
