//! 命令历史模块
//!
//! ## 模块结构
//! - `store` - 按连接名持久化的命令历史（去重、上限、重命名合并）
//! - `cursor` - 会话内的上下键浏览游标

pub mod cursor;
pub mod store;

#[cfg(test)]
mod tests;

pub use cursor::{HistoryCursor, HistoryDirection};
pub use store::{trim_to_cap, HistoryError, HistoryMap, HistoryStore, HISTORY_FILE_NAME, MAX_HISTORY};
