//! 配置管理模块
//!
//! 提供 YAML 配置文件支持：历史文件位置、默认波特率、读超时、
//! 宿主刷新间隔和日志设置。

mod path_utils;
mod types;
mod yaml;

pub use path_utils::{contains_tilde, expand_tilde};
pub use types::{AppConfig, LoggingConfig};
pub use yaml::{
    config_path, load_config, load_config_from, parse_yaml, save_config, save_config_to, to_yaml,
    ConfigError,
};
