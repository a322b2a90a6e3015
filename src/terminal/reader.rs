//! 串口读线程
//!
//! 每个已连接会话一个线程。循环检查连接标志，有数据时按行读取并转换为
//! `Output` 事件；无法按 UTF-8 解码的数据以十六进制形式输出，不丢弃。
//!
//! 断开连接时会话先清除标志再关闭句柄，读线程出错时重新检查标志，
//! 因此主动断开导致的读取错误不会被报告。

use std::io::{self, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use super::channel::EventChannel;
use super::events::{messages, EventKind};
use crate::transport::SerialLink;

/// 没有待读数据时的等待间隔
const IDLE_WAIT: Duration = Duration::from_millis(10);

/// 十六进制回退输出的前缀
pub const HEX_PREFIX: &str = "[HEX] ";

pub(crate) struct SerialReader {
    label: String,
    link: Box<dyn SerialLink>,
    connected: Arc<AtomicBool>,
    events: Arc<EventChannel>,
}

impl SerialReader {
    pub(crate) fn new(
        label: String,
        link: Box<dyn SerialLink>,
        connected: Arc<AtomicBool>,
        events: Arc<EventChannel>,
    ) -> Self {
        Self {
            label,
            link,
            connected,
            events,
        }
    }

    pub(crate) fn spawn(self) -> io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name(format!("serial-reader-{}", self.label))
            .spawn(move || self.run())
    }

    fn run(mut self) {
        tracing::debug!("[串口] {} 读线程启动", self.label);

        while self.connected.load(Ordering::SeqCst) {
            match self.poll_line() {
                Ok(Some(line)) => {
                    self.events
                        .push(EventKind::Output, messages::received(&decode_line(&line)));
                }
                Ok(None) => std::thread::sleep(IDLE_WAIT),
                Err(e) => {
                    // 主动断开时句柄已关闭，此处的错误属于预期
                    if self.connected.load(Ordering::SeqCst) {
                        tracing::error!("[串口] {} 读取错误: {}", self.label, e);
                        self.events.push(EventKind::Error, messages::read_error(&e));
                    }
                    break;
                }
            }
        }

        tracing::debug!("[串口] {} 读线程退出", self.label);
    }

    fn poll_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.link.bytes_to_read()? == 0 {
            return Ok(None);
        }
        let line = read_line(self.link.as_mut())?;
        Ok(if line.is_empty() { None } else { Some(line) })
    }
}

/// 读取一行（含行结束符），遇到读超时返回已读部分
pub(crate) fn read_line(link: &mut dyn SerialLink) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match link.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                line.push(byte[0]);
                if byte[0] == b'\n' {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(line)
}

/// 按 UTF-8 解码并去掉行尾空白，失败时返回 `[HEX] <小写十六进制>`
pub fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_end().to_string(),
        Err(_) => format!("{}{}", HEX_PREFIX, hex::encode(bytes)),
    }
}
