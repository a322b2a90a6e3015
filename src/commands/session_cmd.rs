//! 会话命令
//!
//! 把宿主输入的一行文本解析为对会话管理器的操作。以 `/` 开头的是控制命令，
//! 其余文本作为要发送的命令。
//!
//! ## 命令列表
//! - `/new` - 新建会话
//! - `/close` - 关闭当前会话
//! - `/tab N` - 切换到第 N 个会话
//! - `/connect [port] [baud]` - 连接（省略时使用当前选择）
//! - `/disconnect` - 断开
//! - `/name [name]` - 设置连接名（省略则清空）
//! - `/port P`、`/baud B` - 修改选择
//! - `/ports` - 列出候选端口
//! - `/up`、`/down` - 浏览历史，`/send` 发送输入缓冲
//! - `/sessions`、`/names`、`/help`、`/quit`

use crate::history::HistoryDirection;
use crate::terminal::{SerialError, SerialSessionManager, SessionState};

/// 帮助文本
pub const HELP: &[&str] = &[
    "/new                    open a new connection tab",
    "/close                  close the current tab",
    "/tab N                  switch to tab N",
    "/connect [port] [baud]  connect (defaults to the current selection)",
    "/disconnect             disconnect",
    "/name [name]            set or clear the connection name",
    "/port P | /baud B       change the port or baud rate selection",
    "/ports                  list candidate ports",
    "/up | /down             browse command history",
    "/send                   send the input buffer",
    "/sessions | /names      list tabs or known connection names",
    "/quit                   disconnect everything and exit",
];

/// 宿主命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    NewSession,
    CloseSession,
    SwitchTab(usize),
    Connect {
        port: Option<String>,
        baud_rate: Option<String>,
    },
    Disconnect,
    Name(String),
    Port(String),
    Baud(String),
    Ports,
    History(HistoryDirection),
    SendInput,
    Sessions,
    Names,
    Help,
    Quit,
    Send(String),
}

impl HostCommand {
    /// 解析一行输入
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(HostCommand::Send(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::to_string);

        match command {
            "new" => Ok(HostCommand::NewSession),
            "close" => Ok(HostCommand::CloseSession),
            "tab" => arg
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .map(HostCommand::SwitchTab)
                .ok_or_else(|| "用法: /tab N".to_string()),
            "connect" => Ok(HostCommand::Connect {
                port: arg,
                baud_rate: parts.next().map(str::to_string),
            }),
            "disconnect" => Ok(HostCommand::Disconnect),
            "name" => {
                let name = rest.strip_prefix("name").unwrap_or_default().trim();
                Ok(HostCommand::Name(name.to_string()))
            }
            "port" => arg
                .map(HostCommand::Port)
                .ok_or_else(|| "用法: /port P".to_string()),
            "baud" => arg
                .map(HostCommand::Baud)
                .ok_or_else(|| "用法: /baud B".to_string()),
            "ports" => Ok(HostCommand::Ports),
            "up" => Ok(HostCommand::History(HistoryDirection::Up)),
            "down" => Ok(HostCommand::History(HistoryDirection::Down)),
            "send" => Ok(HostCommand::SendInput),
            "sessions" => Ok(HostCommand::Sessions),
            "names" => Ok(HostCommand::Names),
            "help" => Ok(HostCommand::Help),
            "quit" | "exit" => Ok(HostCommand::Quit),
            other => Err(format!("未知命令: /{}", other)),
        }
    }
}

/// 命令执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// 需要直接显示给用户的文本（可能为空）
    Continue(Vec<String>),
    Quit,
}

impl CommandOutcome {
    fn silent() -> Self {
        CommandOutcome::Continue(Vec::new())
    }
}

/// 对当前会话执行命令
///
/// 连接和发送失败已作为 `Error` 事件写入会话的事件通道，这里不再返回错误；
/// 只有会话管理层面的失败（如关闭最后一个会话）才返回 `Err`。
pub fn execute(
    manager: &mut SerialSessionManager,
    active: &mut String,
    command: HostCommand,
) -> Result<CommandOutcome, SerialError> {
    match command {
        HostCommand::NewSession => {
            *active = manager.create_session().id().to_string();
            Ok(CommandOutcome::silent())
        }
        HostCommand::CloseSession => {
            let index = manager.position(active).unwrap_or(0);
            manager.close_session(active)?;
            let next = index.min(manager.session_count().saturating_sub(1));
            if let Some(session) = manager.session_at(next) {
                *active = session.id().to_string();
            }
            Ok(CommandOutcome::silent())
        }
        HostCommand::SwitchTab(n) => {
            let session = manager
                .session_at(n - 1)
                .ok_or_else(|| SerialError::SessionNotFound(format!("tab {}", n)))?;
            *active = session.id().to_string();
            Ok(CommandOutcome::Continue(vec![format!(
                "switched to {}",
                session.label()
            )]))
        }
        HostCommand::Quit => {
            manager.shutdown();
            Ok(CommandOutcome::Quit)
        }
        HostCommand::Sessions => {
            let lines = manager
                .list_sessions()
                .into_iter()
                .enumerate()
                .map(|(i, meta)| {
                    let marker = if meta.id == *active { "*" } else { " " };
                    let state = match meta.state {
                        SessionState::Connected => "connected",
                        SessionState::Disconnected => "disconnected",
                    };
                    format!(
                        "{}{} {} [{}] {} @ {}",
                        marker,
                        i + 1,
                        meta.label,
                        state,
                        meta.port.unwrap_or_else(|| "-".to_string()),
                        meta.baud_rate
                    )
                })
                .collect();
            Ok(CommandOutcome::Continue(lines))
        }
        HostCommand::Names => Ok(CommandOutcome::Continue(manager.known_names())),
        HostCommand::Help => Ok(CommandOutcome::Continue(
            HELP.iter().map(|line| line.to_string()).collect(),
        )),
        command => {
            let session = manager
                .session_mut(active)
                .ok_or_else(|| SerialError::SessionNotFound(active.clone()))?;
            execute_on_session(session, command)
        }
    }
}

fn execute_on_session(
    session: &mut crate::terminal::SerialSession,
    command: HostCommand,
) -> Result<CommandOutcome, SerialError> {
    match command {
        HostCommand::Connect { port, baud_rate } => {
            if session.is_connected() {
                return Err(SerialError::AlreadyConnected);
            }
            if let Some(port) = port {
                session.select_port(port)?;
            }
            if let Some(baud_rate) = baud_rate {
                session.select_baud_rate(baud_rate)?;
            }
            // 失败已写入事件通道
            let _ = session.toggle_connection();
            Ok(CommandOutcome::silent())
        }
        HostCommand::Disconnect => {
            session.disconnect();
            Ok(CommandOutcome::silent())
        }
        HostCommand::Name(name) => {
            session.apply_name(&name);
            Ok(CommandOutcome::Continue(vec![format!(
                "tab renamed to {}",
                session.label()
            )]))
        }
        HostCommand::Port(port) => {
            session.select_port(port)?;
            Ok(CommandOutcome::silent())
        }
        HostCommand::Baud(baud_rate) => {
            session.select_baud_rate(baud_rate)?;
            Ok(CommandOutcome::silent())
        }
        HostCommand::Ports => Ok(CommandOutcome::Continue(session.available_ports().to_vec())),
        HostCommand::History(direction) => {
            if session.navigate_history(direction) {
                Ok(CommandOutcome::Continue(vec![format!(
                    "input: {}",
                    session.input()
                )]))
            } else {
                Ok(CommandOutcome::silent())
            }
        }
        HostCommand::SendInput => {
            let _ = session.send_input();
            Ok(CommandOutcome::silent())
        }
        HostCommand::Send(text) => {
            session.set_input(text);
            let _ = session.send_input();
            Ok(CommandOutcome::silent())
        }
        _ => Ok(CommandOutcome::silent()),
    }
}
