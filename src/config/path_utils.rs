//! 路径工具

use std::path::PathBuf;

/// 路径是否以 `~` 开头
pub fn contains_tilde(path: &str) -> bool {
    path == "~" || path.starts_with("~/")
}

/// 展开开头的 `~` 为用户主目录，取不到主目录时原样返回
pub fn expand_tilde(path: &str) -> PathBuf {
    if !contains_tilde(path) {
        return PathBuf::from(path);
    }
    match dirs::home_dir() {
        Some(home) if path == "~" => home,
        Some(home) => home.join(&path[2..]),
        None => PathBuf::from(path),
    }
}
