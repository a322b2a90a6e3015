//! 串口会话封装
//!
//! 一个会话对应一个标签页：端口/波特率选择、连接状态机、读线程、
//! 事件通道、输入缓冲和历史游标。
//!
//! ## 功能
//! - 同步连接/断开（成功即 `Connected`，失败保持 `Disconnected`）
//! - 发送命令（转大写，追加 `\n`），记录到命令历史
//! - 连接名修改时迁移历史
//! - 上下键浏览历史
//!
//! ## 线程模型
//! 除读线程外，所有操作都在宿主的协作线程上同步执行，不等待读线程。
//! 读线程持有句柄的一个克隆，只读不写；写入和关闭由会话负责。
//! 读线程的退出只依赖连接标志，断开时不 join。

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use super::channel::EventChannel;
use super::error::SerialError;
use super::events::{messages, EventKind, SessionEvent, SessionState};
use super::reader::SerialReader;
use crate::history::{HistoryCursor, HistoryDirection, HistoryStore};
use crate::transport::{SerialConnector, SerialLink};

/// 可选波特率
pub const BAUD_RATES: [u32; 8] = [9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600];
/// 默认波特率
pub const DEFAULT_BAUD_RATE: u32 = 115200;
/// 默认读超时
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// 会话参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// 串口读超时，同时决定读线程发现断开的最长延迟
    pub read_timeout: Duration,
    /// 新会话的默认波特率
    pub default_baud_rate: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            default_baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

/// 已建立的连接
struct ActiveConnection {
    port: String,
    baud_rate: u32,
    writer: Box<dyn SerialLink>,
    connected: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

/// 串口会话
pub struct SerialSession {
    id: String,
    tab_number: u64,
    created_at: i64,
    /// 连接名，为空表示未命名（不记录历史）
    name: String,
    selected_port: Option<String>,
    selected_baud_rate: String,
    available_ports: Vec<String>,
    input: String,
    history: Vec<String>,
    cursor: HistoryCursor,
    connection: Option<ActiveConnection>,
    events: Arc<EventChannel>,
    store: Arc<HistoryStore>,
    connector: Arc<dyn SerialConnector>,
    settings: SessionSettings,
}

impl SerialSession {
    /// 创建未连接的会话
    pub fn new(
        tab_number: u64,
        store: Arc<HistoryStore>,
        connector: Arc<dyn SerialConnector>,
        settings: SessionSettings,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        tracing::info!("[串口] 创建会话 {} (Connection {})", id, tab_number);
        Self {
            id,
            tab_number,
            created_at: Utc::now().timestamp_millis(),
            name: String::new(),
            selected_port: None,
            selected_baud_rate: settings.default_baud_rate.to_string(),
            available_ports: Vec::new(),
            input: String::new(),
            history: Vec::new(),
            cursor: HistoryCursor::new(),
            connection: None,
            events: Arc::new(EventChannel::new()),
            store,
            connector,
            settings,
        }
    }

    /// 获取会话 ID
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tab_number(&self) -> u64 {
        self.tab_number
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// 标签文本：连接名，未命名时为 `Connection {N}`
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("Connection {}", self.tab_number)
        } else {
            self.name.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SessionState {
        if self.connection.is_some() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// 读线程是否仍在运行；读取出错退出后会话仍保持 `Connected`
    pub fn reader_alive(&self) -> bool {
        self.connection
            .as_ref()
            .map(|conn| !conn.reader.is_finished())
            .unwrap_or(false)
    }

    /// 已连接时返回实际使用的端口，否则返回当前选择
    pub fn port(&self) -> Option<&str> {
        match &self.connection {
            Some(conn) => Some(conn.port.as_str()),
            None => self.selected_port.as_deref(),
        }
    }

    pub fn baud_rate(&self) -> &str {
        &self.selected_baud_rate
    }

    /// 已连接时的实际波特率
    pub fn connected_baud_rate(&self) -> Option<u32> {
        self.connection.as_ref().map(|conn| conn.baud_rate)
    }

    /// 候选端口列表
    pub fn available_ports(&self) -> &[String] {
        &self.available_ports
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn cursor(&self) -> &HistoryCursor {
        &self.cursor
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// 事件通道（可交给其他线程持有）
    pub fn events(&self) -> Arc<EventChannel> {
        self.events.clone()
    }

    /// 取出所有待显示事件
    pub fn drain_events(&self) -> Vec<SessionEvent> {
        self.events.drain_all()
    }

    pub(crate) fn notify(&self, text: impl Into<String>) {
        self.events.push(EventKind::Info, text);
    }

    // ------------------------------------------------------------------
    // 端口选择
    // ------------------------------------------------------------------

    pub fn select_port(&mut self, port: impl Into<String>) -> Result<(), SerialError> {
        if self.is_connected() {
            return Err(SerialError::SelectionLocked);
        }
        self.selected_port = Some(port.into());
        Ok(())
    }

    pub fn select_baud_rate(&mut self, baud_rate: impl Into<String>) -> Result<(), SerialError> {
        if self.is_connected() {
            return Err(SerialError::SelectionLocked);
        }
        self.selected_baud_rate = baud_rate.into();
        Ok(())
    }

    /// 更新候选端口，保留仍然存在的当前选择，否则选中第一个
    ///
    /// 已连接时不做修改，返回 `false`。
    pub fn refresh_ports(&mut self, ports: &[String]) -> bool {
        if self.is_connected() {
            return false;
        }
        self.available_ports = ports.to_vec();
        let keep = self
            .selected_port
            .as_ref()
            .is_some_and(|current| ports.contains(current));
        if !keep {
            self.selected_port = ports.first().cloned();
        }
        true
    }

    // ------------------------------------------------------------------
    // 连接状态机
    // ------------------------------------------------------------------

    /// 按当前选择连接，已连接时断开
    pub fn toggle_connection(&mut self) -> Result<(), SerialError> {
        if self.is_connected() {
            self.disconnect();
            return Ok(());
        }
        let port = self.selected_port.clone().unwrap_or_default();
        let baud_rate = self.selected_baud_rate.clone();
        self.connect(&port, &baud_rate)
    }

    /// 打开端口并启动读线程
    ///
    /// 失败时保持 `Disconnected`，向事件通道写入 `Error` 事件并返回错误。
    pub fn connect(&mut self, port: &str, baud_rate: &str) -> Result<(), SerialError> {
        if self.is_connected() {
            return Err(SerialError::AlreadyConnected);
        }

        let port = port.trim();
        if port.is_empty() {
            self.events.push(EventKind::Error, messages::SELECT_PORT);
            return Err(SerialError::NoPortSelected);
        }
        self.selected_port = Some(port.to_string());
        self.selected_baud_rate = baud_rate.to_string();

        let Some(baud) = parse_baud_rate(baud_rate) else {
            self.events.push(EventKind::Error, messages::INVALID_BAUDRATE);
            return Err(SerialError::InvalidBaudRate(baud_rate.to_string()));
        };

        let opened = self
            .connector
            .open(port, baud, self.settings.read_timeout)
            .and_then(|writer| {
                let reader_link = writer.try_clone_link()?;
                Ok((writer, reader_link))
            });
        let (writer, reader_link) = match opened {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("[串口] 会话 {} 打开 {} 失败: {}", self.id, port, e);
                self.events.push(EventKind::Error, messages::open_error(&e));
                return Err(SerialError::PortOpenFailed(e.to_string()));
            }
        };

        let connected = Arc::new(AtomicBool::new(true));
        self.events
            .push(EventKind::Info, messages::connected(port, baud));

        let reader = SerialReader::new(
            self.label(),
            reader_link,
            connected.clone(),
            self.events.clone(),
        );
        let reader = match reader.spawn() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("[串口] 会话 {} 无法启动读线程: {}", self.id, e);
                self.events.push(EventKind::Error, messages::open_error(&e));
                return Err(SerialError::PortOpenFailed(e.to_string()));
            }
        };

        self.connection = Some(ActiveConnection {
            port: port.to_string(),
            baud_rate: baud,
            writer,
            connected,
            reader,
        });
        tracing::info!("[串口] 会话 {} 已连接 {} @ {}", self.id, port, baud);
        Ok(())
    }

    /// 断开连接；未连接时不做任何事
    pub fn disconnect(&mut self) {
        let Some(conn) = self.connection.take() else {
            return;
        };
        // 先清除标志，读线程随后遇到的错误不会被报告
        conn.connected.store(false, Ordering::SeqCst);
        drop(conn.writer);
        drop(conn.reader);

        self.events.push(EventKind::Info, messages::DISCONNECTED);
        tracing::info!("[串口] 会话 {} 已断开 {}", self.id, conn.port);
    }

    /// 发送一条命令
    ///
    /// 文本转为大写后加 `\n` 写出。写入失败只产生 `Error` 事件，不会断开连接。
    pub fn send(&mut self, text: &str) -> Result<(), SerialError> {
        let Some(conn) = self.connection.as_mut() else {
            self.events.push(EventKind::Error, messages::NOT_CONNECTED);
            return Err(SerialError::NotConnected);
        };

        let command = text.to_uppercase();
        if command.is_empty() {
            return Ok(());
        }

        let payload = format!("{}\n", command);
        let written = conn
            .writer
            .write_all(payload.as_bytes())
            .and_then(|_| conn.writer.flush());
        if let Err(e) = written {
            tracing::warn!("[串口] 会话 {} 写入失败: {}", self.id, e);
            self.events.push(EventKind::Error, messages::send_error(&e));
            return Err(SerialError::WriteFailed(e.to_string()));
        }

        self.events.push(EventKind::Input, messages::sent(&command));
        if !self.name.is_empty() {
            self.history = self.store.append(&self.name, &command);
        }
        self.cursor.reset();
        Ok(())
    }

    /// 发送输入缓冲中的文本，成功后清空缓冲；失败时保留
    pub fn send_input(&mut self) -> Result<(), SerialError> {
        let text = self.input.clone();
        self.send(&text)?;
        self.input.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // 连接名与历史
    // ------------------------------------------------------------------

    /// 应用连接名
    ///
    /// - 与当前名称相同：忽略
    /// - 旧名和新名都非空：迁移并合并历史
    /// - 只有新名：读取新名下的历史
    /// - 新名为空：清空当前历史（存储不变）
    pub fn apply_name(&mut self, new_name: &str) {
        let new_name = new_name.trim();
        if new_name == self.name {
            return;
        }

        self.history = if new_name.is_empty() {
            Vec::new()
        } else if self.name.is_empty() {
            self.store.load(new_name)
        } else {
            self.store.rename(&self.name, new_name)
        };

        tracing::info!(
            "[串口] 会话 {} 连接名 '{}' -> '{}'，历史 {} 条",
            self.id,
            self.name,
            new_name,
            self.history.len()
        );
        self.name = new_name.to_string();
        self.cursor.reset();
    }

    /// 浏览历史，把输入缓冲替换为对应命令
    ///
    /// 返回是否处理了该按键（无历史、或未浏览时按下键都返回 `false`）。
    pub fn navigate_history(&mut self, direction: HistoryDirection) -> bool {
        match self.cursor.navigate(direction, &self.history, &self.input) {
            Some(text) => {
                self.input = text;
                true
            }
            None => false,
        }
    }
}

impl Drop for SerialSession {
    fn drop(&mut self) {
        if let Some(conn) = &self.connection {
            conn.connected.store(false, Ordering::SeqCst);
        }
    }
}

/// 解析波特率，必须是正整数
pub fn parse_baud_rate(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|baud| *baud > 0)
}
