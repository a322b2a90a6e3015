//! 命令历史持久化
//!
//! 以连接名为键保存发送过的命令，整个映射存放在一个 JSON 文件中：
//!
//! ```json
//! {
//!   "ESP32": [
//!     "LED ON",
//!     "LED OFF"
//!   ]
//! }
//! ```
//!
//! 每次读写都加载整个映射、修改对应键、再整体写回。
//! 读取失败视为没有历史；写入失败只记录日志，不影响调用方。

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use parking_lot::Mutex;
use thiserror::Error;

/// 每个连接最多保留的命令数
pub const MAX_HISTORY: usize = 500;

/// 默认历史文件名
pub const HISTORY_FILE_NAME: &str = "serial_command_history.json";

/// 连接名 -> 命令序列（旧的在前）
pub type HistoryMap = IndexMap<String, Vec<String>>;

/// 历史文件读写错误（仅在模块内部使用）
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("历史文件读取失败: {0}")]
    Read(String),

    #[error("历史文件解析失败: {0}")]
    Parse(String),

    #[error("历史文件写入失败: {0}")]
    Write(String),

    #[error("历史序列化失败: {0}")]
    Serialize(String),
}

/// 命令历史存储
///
/// 只在协作线程（宿主侧）访问，读线程从不接触。
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    /// 串行化同一进程内的读-改-写
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `~/.serialcast/serial_command_history.json`，取不到主目录时退回当前目录
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(".serialcast").join(HISTORY_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(HISTORY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取某个连接的历史，不存在或文件损坏时返回空
    pub fn load(&self, name: &str) -> Vec<String> {
        let _guard = self.lock.lock();
        self.read_all().get(name).cloned().unwrap_or_default()
    }

    /// 已保存历史的连接名（排序后）
    pub fn names(&self) -> Vec<String> {
        let _guard = self.lock.lock();
        let mut names: Vec<String> = self.read_all().into_keys().collect();
        names.sort();
        names
    }

    /// 追加一条命令，返回追加后的序列
    ///
    /// 名称为空或命令为空白时不做任何修改。与上一条相同的命令不会重复记录。
    pub fn append(&self, name: &str, command: &str) -> Vec<String> {
        if name.is_empty() {
            return Vec::new();
        }
        let _guard = self.lock.lock();
        let mut all = self.read_all();
        if command.trim().is_empty() {
            return all.get(name).cloned().unwrap_or_default();
        }

        let entries = all.entry(name.to_string()).or_default();
        if entries.last().map(String::as_str) != Some(command) {
            entries.push(command.to_string());
        }
        trim_to_cap(entries);
        let result = entries.clone();

        self.write_all(&all);
        result
    }

    /// 把 `old_name` 的历史迁移到 `new_name`，返回新名称下的序列
    ///
    /// 合并顺序为 `new_name` 原有历史在前、迁移来的历史在后，再截断到上限。
    /// 名称相同、任一侧为空时不修改存储。
    pub fn rename(&self, old_name: &str, new_name: &str) -> Vec<String> {
        if new_name.is_empty() {
            return Vec::new();
        }
        if old_name.is_empty() || old_name == new_name {
            return self.load(new_name);
        }

        let _guard = self.lock.lock();
        let mut all = self.read_all();
        let migrated = all.shift_remove(old_name).unwrap_or_default();
        let mut merged = all.get(new_name).cloned().unwrap_or_default();
        merged.extend(migrated);
        trim_to_cap(&mut merged);
        all.insert(new_name.to_string(), merged.clone());

        self.write_all(&all);
        tracing::info!(
            "[历史] 连接 {} 重命名为 {}，合并后 {} 条",
            old_name,
            new_name,
            merged.len()
        );
        merged
    }

    fn read_all(&self) -> HistoryMap {
        match self.try_read_all() {
            Ok(all) => all,
            Err(e) => {
                tracing::warn!("[历史] {}，按空历史处理", e);
                HistoryMap::new()
            }
        }
    }

    fn try_read_all(&self) -> Result<HistoryMap, HistoryError> {
        if !self.path.exists() {
            return Ok(HistoryMap::new());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| HistoryError::Read(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| HistoryError::Parse(e.to_string()))
    }

    fn write_all(&self, all: &HistoryMap) {
        if let Err(e) = self.try_write_all(all) {
            tracing::warn!("[历史] {}", e);
        }
    }

    fn try_write_all(&self, all: &HistoryMap) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| HistoryError::Write(e.to_string()))?;
            }
        }
        let content =
            serde_json::to_string_pretty(all).map_err(|e| HistoryError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| HistoryError::Write(e.to_string()))
    }
}

/// 从头部丢弃，只保留最近的 [`MAX_HISTORY`] 条
pub fn trim_to_cap(entries: &mut Vec<String>) {
    if entries.len() > MAX_HISTORY {
        let excess = entries.len() - MAX_HISTORY;
        entries.drain(0..excess);
    }
}
