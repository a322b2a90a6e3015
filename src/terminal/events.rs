//! 串口会话事件定义
//!
//! 读线程和会话操作产生的所有输出都以事件形式进入会话的事件通道，
//! 由宿主定期取出并按顺序显示。
//!
//! ## 事件类型
//! - `output` - 设备发来的数据（`<< ...`）
//! - `input` - 已发送的命令（`>> ...`）
//! - `error` - 连接、收发错误
//! - `info` - 连接状态与端口变化提示

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// 会话状态
///
/// 连接是同步完成的，不存在可观察的“连接中”状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// 未连接
    #[default]
    Disconnected,
    /// 已连接
    Connected,
}

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Output,
    Input,
    Error,
    Info,
}

/// 会话事件，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub kind: EventKind,
    pub text: String,
    /// 入队时间（Unix 时间戳，毫秒）
    pub timestamp: i64,
}

impl SessionEvent {
    pub fn new(kind: EventKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self::new(EventKind::Output, text)
    }

    pub fn input(text: impl Into<String>) -> Self {
        Self::new(EventKind::Input, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(EventKind::Error, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(EventKind::Info, text)
    }
}

/// 事件文本常量
pub mod messages {
    pub const DISCONNECTED: &str = "Disconnected";
    pub const NOT_CONNECTED: &str = "Not connected";
    pub const INVALID_BAUDRATE: &str = "Invalid baudrate";
    pub const SELECT_PORT: &str = "Please select a port";

    pub fn connected(port: &str, baud_rate: u32) -> String {
        format!("Connected to {} at {} baud", port, baud_rate)
    }

    pub fn open_error(reason: impl std::fmt::Display) -> String {
        format!("Error: {}", reason)
    }

    pub fn send_error(reason: impl std::fmt::Display) -> String {
        format!("Send error: {}", reason)
    }

    pub fn read_error(reason: impl std::fmt::Display) -> String {
        format!("Read error: {}", reason)
    }

    pub fn sent(command: &str) -> String {
        format!(">> {}", command)
    }

    pub fn received(text: &str) -> String {
        format!("<< {}", text)
    }

    pub fn ports_detected(ports: &[String]) -> String {
        format!("USB port(s) detected: {}", ports.join(", "))
    }

    pub fn ports_removed(ports: &[String]) -> String {
        format!("USB port(s) removed: {}", ports.join(", "))
    }
}
