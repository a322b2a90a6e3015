//! SerialCast 命令行宿主
//!
//! 从 stdin 逐行读取输入，定时取出各会话事件并打印，定时轮询端口变化。

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use serialcast_lib::commands::{execute, CommandOutcome, HostCommand};
use serialcast_lib::config::{self, AppConfig};
use serialcast_lib::logger;
use serialcast_lib::terminal::{EventKind, SerialSessionManager};
use serialcast_lib::transport::{NativeConnector, NativeDiscovery};
use serialcast_lib::HistoryStore;

fn color(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Output => "\x1b[32m",
        EventKind::Input => "\x1b[36m",
        EventKind::Error => "\x1b[31m",
        EventKind::Info => "\x1b[33m",
    }
}

fn render(manager: &SerialSessionManager) {
    for (id, events) in manager.drain_all() {
        let label = manager
            .session(&id)
            .map(|s| s.label())
            .unwrap_or_default();
        for event in events {
            println!("{}[{}] {}\x1b[0m", color(event.kind), label, event.text);
        }
    }
}

fn load_config() -> AppConfig {
    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}，使用默认配置", e);
            AppConfig::default()
        }
    };
    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            eprintln!("{}，使用默认配置", e);
            AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() {
    let config = load_config();
    logger::init(&config.logging);

    let store = Arc::new(HistoryStore::new(config.history_path()));
    let mut manager = SerialSessionManager::new(
        store,
        Arc::new(NativeConnector),
        Arc::new(NativeDiscovery),
        config.session_settings(),
    );
    let mut active = manager.create_session().id().to_string();
    println!("serialcast - type /help for commands");

    let mut drain_tick = tokio::time::interval(config.drain_interval());
    let mut port_tick = tokio::time::interval(config.port_poll_interval());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = drain_tick.tick() => render(&manager),
            _ = port_tick.tick() => {
                manager.poll_ports();
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("[宿主] 读取输入失败: {}", e);
                        break;
                    }
                };
                let command = match HostCommand::parse(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message);
                        continue;
                    }
                };
                match execute(&mut manager, &mut active, command) {
                    Ok(CommandOutcome::Continue(output)) => {
                        for text in output {
                            println!("{}", text);
                        }
                    }
                    Ok(CommandOutcome::Quit) => break,
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    manager.shutdown();
    render(&manager);
}
