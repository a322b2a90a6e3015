//! 串口会话管理器
//!
//! 管理所有会话（标签页）的生命周期，并定期轮询端口变化。
//!
//! ## 功能
//! - 按创建顺序维护会话列表
//! - 生成递增且不复用的标签编号（`Connection {N}`）
//! - 关闭会话前自动断开，始终保留至少一个会话
//! - 端口增减时通知每个会话并刷新其候选端口

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::SerialError;
use super::events::{messages, SessionEvent, SessionState};
use super::serial_session::{SerialSession, SessionSettings};
use crate::history::HistoryStore;
use crate::transport::{PortDiscovery, SerialConnector};

/// 会话元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// 会话 ID
    pub id: String,
    /// 标签文本
    pub label: String,
    /// 连接名（可能为空）
    pub name: String,
    /// 端口
    pub port: Option<String>,
    /// 波特率（选择框文本）
    pub baud_rate: String,
    /// 会话状态
    pub state: SessionState,
    /// 创建时间（Unix 时间戳，毫秒）
    pub created_at: i64,
}

impl From<&SerialSession> for SessionMetadata {
    fn from(session: &SerialSession) -> Self {
        Self {
            id: session.id().to_string(),
            label: session.label(),
            name: session.name().to_string(),
            port: session.port().map(str::to_string),
            baud_rate: session.baud_rate().to_string(),
            state: session.state(),
            created_at: session.created_at(),
        }
    }
}

/// 一次端口轮询的差异
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl PortChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// 串口会话管理器
pub struct SerialSessionManager {
    /// 会话列表（标签页顺序）
    sessions: Vec<SerialSession>,
    /// 下一个标签编号
    next_tab: u64,
    /// 上次轮询看到的端口
    known_ports: BTreeSet<String>,
    store: Arc<HistoryStore>,
    connector: Arc<dyn SerialConnector>,
    discovery: Arc<dyn PortDiscovery>,
    settings: SessionSettings,
}

impl SerialSessionManager {
    /// 创建新的会话管理器（不含任何会话）
    pub fn new(
        store: Arc<HistoryStore>,
        connector: Arc<dyn SerialConnector>,
        discovery: Arc<dyn PortDiscovery>,
        settings: SessionSettings,
    ) -> Self {
        tracing::info!("[串口] 会话管理器已初始化，历史文件: {}", store.path().display());
        Self {
            sessions: Vec::new(),
            next_tab: 1,
            known_ports: BTreeSet::new(),
            store,
            connector,
            discovery,
            settings,
        }
    }

    /// 新建会话并追加到末尾
    pub fn create_session(&mut self) -> &mut SerialSession {
        let mut session = SerialSession::new(
            self.next_tab,
            self.store.clone(),
            self.connector.clone(),
            self.settings,
        );
        self.next_tab += 1;
        session.refresh_ports(&self.discovery.list_ports());

        self.sessions.push(session);
        let index = self.sessions.len() - 1;
        &mut self.sessions[index]
    }

    /// 关闭会话
    ///
    /// 最后一个会话不能关闭；已连接的会话先断开。
    pub fn close_session(&mut self, session_id: &str) -> Result<(), SerialError> {
        let index = self
            .position(session_id)
            .ok_or_else(|| SerialError::SessionNotFound(session_id.to_string()))?;
        if self.sessions.len() <= 1 {
            return Err(SerialError::LastSession);
        }

        let mut session = self.sessions.remove(index);
        session.disconnect();

        tracing::info!("[串口] 关闭会话: {}", session_id);
        Ok(())
    }

    pub fn session(&self, session_id: &str) -> Option<&SerialSession> {
        self.sessions.iter().find(|s| s.id() == session_id)
    }

    pub fn session_mut(&mut self, session_id: &str) -> Option<&mut SerialSession> {
        self.sessions.iter_mut().find(|s| s.id() == session_id)
    }

    /// 按标签页位置获取会话
    pub fn session_at(&self, index: usize) -> Option<&SerialSession> {
        self.sessions.get(index)
    }

    pub fn position(&self, session_id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id() == session_id)
    }

    pub fn sessions(&self) -> &[SerialSession] {
        &self.sessions
    }

    /// 获取所有会话元数据
    pub fn list_sessions(&self) -> Vec<SessionMetadata> {
        self.sessions.iter().map(SessionMetadata::from).collect()
    }

    /// 获取会话数量
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// 历史中已有的连接名，供连接名下拉框使用
    pub fn known_names(&self) -> Vec<String> {
        self.store.names()
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    /// 依次取出每个会话的待显示事件
    pub fn drain_all(&self) -> Vec<(String, Vec<SessionEvent>)> {
        self.sessions
            .iter()
            .map(|s| (s.id().to_string(), s.drain_events()))
            .filter(|(_, events)| !events.is_empty())
            .collect()
    }

    /// 轮询端口变化
    ///
    /// 有变化时向每个会话写入 `Info` 事件并刷新候选端口（已连接的会话不刷新）。
    pub fn poll_ports(&mut self) -> PortChange {
        let current: BTreeSet<String> = self.discovery.list_ports().into_iter().collect();
        if current == self.known_ports {
            return PortChange::default();
        }

        let change = PortChange {
            added: current.difference(&self.known_ports).cloned().collect(),
            removed: self.known_ports.difference(&current).cloned().collect(),
        };
        self.known_ports = current;
        tracing::info!(
            "[端口] 新增 {:?}，移除 {:?}",
            change.added,
            change.removed
        );

        let ports: Vec<String> = self.known_ports.iter().cloned().collect();
        for session in &mut self.sessions {
            if !change.added.is_empty() {
                session.notify(messages::ports_detected(&change.added));
            }
            if !change.removed.is_empty() {
                session.notify(messages::ports_removed(&change.removed));
            }
            session.refresh_ports(&ports);
        }
        change
    }

    /// 断开所有会话（退出前调用）
    pub fn shutdown(&mut self) {
        for session in self.sessions.iter_mut().filter(|s| s.is_connected()) {
            session.disconnect();
        }
        tracing::info!("[串口] 所有会话已断开");
    }
}
