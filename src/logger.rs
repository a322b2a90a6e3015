//! 日志初始化
//!
//! 日志输出到 stderr，stdout 留给终端输出。

use tracing::Level;

use crate::config::LoggingConfig;

/// 按配置初始化全局 tracing 订阅者
///
/// 重复调用或已有其他订阅者时静默忽略。
pub fn init(config: &LoggingConfig) {
    if !config.enabled {
        return;
    }

    let level = parse_level(&config.level);
    let result = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if result.is_ok() {
        tracing::debug!("[日志] 已初始化，级别: {}", level);
    }
}

/// 解析日志级别，无法识别时使用 info
pub fn parse_level(level: &str) -> Level {
    level.trim().parse::<Level>().unwrap_or(Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LoggingConfig::default();
        init(&config);
        init(&config);
    }
}
