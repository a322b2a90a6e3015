//! 内存模拟串口，用于测试会话引擎

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{PortDiscovery, SerialConnector, SerialLink};

#[derive(Default)]
struct MockState {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    write_error: Option<String>,
    read_error: Option<String>,
}

/// 一个模拟设备，所有克隆出的句柄共享同一状态
#[derive(Clone, Default)]
pub struct MockPort {
    state: Arc<Mutex<MockState>>,
    live_links: Arc<AtomicUsize>,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟设备发送数据
    pub fn inject(&self, bytes: &[u8]) {
        self.state.lock().inbound.extend(bytes.iter().copied());
    }

    /// 已写入设备的全部字节
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().outbound.clone()
    }

    pub fn fail_writes(&self, reason: &str) {
        self.state.lock().write_error = Some(reason.to_string());
    }

    pub fn fail_reads(&self, reason: &str) {
        self.state.lock().read_error = Some(reason.to_string());
    }

    /// 尚未释放的句柄数
    pub fn live_links(&self) -> usize {
        self.live_links.load(Ordering::SeqCst)
    }

    fn link(&self) -> MockLink {
        self.live_links.fetch_add(1, Ordering::SeqCst);
        MockLink { port: self.clone() }
    }
}

pub struct MockLink {
    port: MockPort,
}

impl Drop for MockLink {
    fn drop(&mut self) {
        self.port.live_links.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Read for MockLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.port.state.lock();
        if let Some(reason) = &state.read_error {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, reason.clone()));
        }
        if state.inbound.is_empty() {
            drop(state);
            std::thread::sleep(Duration::from_millis(1));
            return Err(io::Error::new(io::ErrorKind::TimedOut, "Operation timed out"));
        }
        let n = buf.len().min(state.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(state.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MockLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.port.state.lock();
        if let Some(reason) = &state.write_error {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, reason.clone()));
        }
        state.outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialLink for MockLink {
    fn bytes_to_read(&self) -> io::Result<u32> {
        let state = self.port.state.lock();
        if let Some(reason) = &state.read_error {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, reason.clone()));
        }
        Ok(state.inbound.len() as u32)
    }

    fn try_clone_link(&self) -> io::Result<Box<dyn SerialLink>> {
        Ok(Box::new(self.port.link()))
    }
}

/// 只能打开预先登记过的端口
#[derive(Default)]
pub struct MockConnector {
    ports: Mutex<HashMap<String, MockPort>>,
    opens: AtomicUsize,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个端口并返回其模拟设备
    pub fn add_port(&self, name: &str) -> MockPort {
        self.ports
            .lock()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// 成功打开的次数
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl SerialConnector for MockConnector {
    fn open(
        &self,
        port: &str,
        _baud_rate: u32,
        _read_timeout: Duration,
    ) -> io::Result<Box<dyn SerialLink>> {
        let ports = self.ports.lock();
        let device = ports.get(port).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("could not open port {}: No such file or directory", port),
            )
        })?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(device.link()))
    }
}

/// 返回可由测试修改的端口列表
#[derive(Default)]
pub struct MockDiscovery {
    ports: Mutex<Vec<String>>,
}

impl MockDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ports(&self, ports: &[&str]) {
        *self.ports.lock() = ports.iter().map(|p| p.to_string()).collect();
    }
}

impl PortDiscovery for MockDiscovery {
    fn list_ports(&self) -> Vec<String> {
        self.ports.lock().clone()
    }
}
