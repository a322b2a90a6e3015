//! 配置类型定义

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::path_utils::expand_tilde;
use super::yaml::ConfigError;
use crate::history::HistoryStore;
use crate::terminal::{SessionSettings, BAUD_RATES, DEFAULT_BAUD_RATE};

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 命令历史文件路径（支持 ~ 展开），为空时使用默认位置
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<String>,
    /// 新会话的默认波特率
    #[serde(default = "default_baud_rate")]
    pub default_baud_rate: u32,
    /// 串口读超时（毫秒）
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// 事件取出间隔（毫秒）
    #[serde(default = "default_drain_interval_ms")]
    pub drain_interval_ms: u64,
    /// 端口轮询间隔（毫秒）
    #[serde(default = "default_port_poll_interval_ms")]
    pub port_poll_interval_ms: u64,
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    1000
}

fn default_drain_interval_ms() -> u64 {
    100
}

fn default_port_poll_interval_ms() -> u64 {
    2000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            default_baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
            drain_interval_ms: default_drain_interval_ms(),
            port_poll_interval_ms: default_port_poll_interval_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// 命令历史文件的实际路径
    pub fn history_path(&self) -> PathBuf {
        match self.history_file.as_deref() {
            Some(path) if !path.trim().is_empty() => expand_tilde(path.trim()),
            _ => HistoryStore::default_path(),
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.drain_interval_ms)
    }

    pub fn port_poll_interval(&self) -> Duration {
        Duration::from_millis(self.port_poll_interval_ms)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            read_timeout: self.read_timeout(),
            default_baud_rate: self.default_baud_rate,
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !BAUD_RATES.contains(&self.default_baud_rate) {
            return Err(ConfigError::ValidationError(format!(
                "不支持的波特率: {}",
                self.default_baud_rate
            )));
        }
        for (field, value) in [
            ("read_timeout_ms", self.read_timeout_ms),
            ("drain_interval_ms", self.drain_interval_ms),
            ("port_poll_interval_ms", self.port_poll_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!("{} 必须大于 0", field)));
            }
        }
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 是否启用日志
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            level: default_log_level(),
        }
    }
}
