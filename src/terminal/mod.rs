//! 串口终端核心模块
//!
//! 提供串口会话状态机、后台读线程、事件通道和会话管理能力，
//! 任何宿主（命令行、GUI、测试）都只通过会话方法和取出的事件驱动它。
//!
//! ## 模块结构
//! - `error` - 错误类型定义
//! - `events` - 会话事件定义
//! - `channel` - 事件通道
//! - `reader` - 串口读线程
//! - `serial_session` - 串口会话封装
//! - `session_manager` - 会话管理器
//!
//! ## 使用示例
//! ```ignore
//! use serialcast_lib::terminal::SerialSessionManager;
//!
//! let mut manager = SerialSessionManager::new(store, connector, discovery, settings);
//! let session = manager.create_session();
//! session.connect("/dev/ttyUSB0", "115200")?;
//! session.send("led on")?;
//! for event in session.drain_events() { /* ... */ }
//! ```

pub mod channel;
pub mod error;
pub mod events;
pub mod reader;
pub mod serial_session;
pub mod session_manager;


// 重新导出常用类型
pub use channel::EventChannel;
pub use error::SerialError;
pub use events::{EventKind, SessionEvent, SessionState};
pub use reader::{decode_line, HEX_PREFIX};
pub use serial_session::{
    parse_baud_rate, SerialSession, SessionSettings, BAUD_RATES, DEFAULT_BAUD_RATE,
    DEFAULT_READ_TIMEOUT,
};
pub use session_manager::{PortChange, SerialSessionManager, SessionMetadata};
