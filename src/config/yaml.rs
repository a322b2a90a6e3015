//! YAML 配置文件支持
//!
//! 提供配置的加载和保存。配置文件不存在时使用默认配置。

use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// 配置目录名
const CONFIG_DIR: &str = ".serialcast";
/// 配置文件名
const CONFIG_FILE: &str = "config.yaml";

/// 配置错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 文件读取错误
    ReadError(String),
    /// 文件写入错误
    WriteError(String),
    /// YAML 解析错误
    ParseError(String),
    /// YAML 序列化错误
    SerializeError(String),
    /// 配置验证错误
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "配置读取错误: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "配置写入错误: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "YAML 解析错误: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "YAML 序列化错误: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "配置验证错误: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// 默认配置文件路径 `~/.serialcast/config.yaml`
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// 从默认位置加载配置
pub fn load_config() -> Result<AppConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(AppConfig::default()),
    }
}

/// 从指定路径加载配置，文件不存在时返回默认配置
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;
    let config = parse_yaml(&content)?;
    tracing::info!("[配置] 已加载 {}", path.display());
    Ok(config)
}

/// 保存配置到默认位置
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_path()
        .ok_or_else(|| ConfigError::WriteError("无法确定主目录".to_string()))?;
    save_config_to(config, &path)
}

/// 保存配置到指定路径
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // 确保父目录存在
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
    }
    let yaml = to_yaml(config)?;
    std::fs::write(path, yaml).map_err(|e| ConfigError::WriteError(e.to_string()))
}

/// 从 YAML 字符串解析配置
pub fn parse_yaml(yaml: &str) -> Result<AppConfig, ConfigError> {
    // 空文件按默认配置处理
    if yaml.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// 将配置序列化为 YAML 字符串
pub fn to_yaml(config: &AppConfig) -> Result<String, ConfigError> {
    serde_yaml::to_string(config).map_err(|e| ConfigError::SerializeError(e.to_string()))
}
