//! 串口终端错误类型
//!
//! ## 功能
//! - 连接、收发错误
//! - 会话管理错误
//! - 序列化支持（转为字符串）

use thiserror::Error;

/// 串口终端错误类型
#[derive(Debug, Error)]
pub enum SerialError {
    /// 端口打开失败（设备不存在、被占用等）
    #[error("端口打开失败: {0}")]
    PortOpenFailed(String),

    /// 波特率不是正整数
    #[error("无效的波特率: {0}")]
    InvalidBaudRate(String),

    /// 未选择端口
    #[error("未选择端口")]
    NoPortSelected,

    /// 会话未连接
    #[error("会话未连接")]
    NotConnected,

    /// 会话已连接
    #[error("会话已连接")]
    AlreadyConnected,

    /// 连接期间不允许修改端口/波特率
    #[error("连接期间无法修改端口设置")]
    SelectionLocked,

    /// 写入失败
    #[error("写入失败: {0}")]
    WriteFailed(String),

    /// 读取失败
    #[error("读取失败: {0}")]
    ReadFailed(String),

    /// 会话不存在
    #[error("会话不存在: {0}")]
    SessionNotFound(String),

    /// 至少保留一个会话
    #[error("无法关闭最后一个会话")]
    LastSession,
}

impl From<SerialError> for String {
    fn from(err: SerialError) -> Self {
        err.to_string()
    }
}

impl serde::Serialize for SerialError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
