//! 基于 `serialport` 的串口实现

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort, StopBits};

use super::{filter_ports, PortDiscovery, SerialConnector, SerialLink};

/// 真实串口句柄
pub struct NativeLink {
    port: Box<dyn SerialPort>,
}

impl NativeLink {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Read for NativeLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for NativeLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl SerialLink for NativeLink {
    fn bytes_to_read(&self) -> io::Result<u32> {
        self.port.bytes_to_read().map_err(io::Error::from)
    }

    fn try_clone_link(&self) -> io::Result<Box<dyn SerialLink>> {
        let port = self.port.try_clone().map_err(io::Error::from)?;
        Ok(Box::new(NativeLink::new(port)))
    }
}

/// 通过操作系统打开串口
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeConnector;

impl SerialConnector for NativeConnector {
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> io::Result<Box<dyn SerialLink>> {
        tracing::debug!("[串口] 打开 {} @ {} baud", port, baud_rate);
        let handle = serialport::new(port, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(read_timeout)
            .open()
            .map_err(io::Error::from)?;
        Ok(Box::new(NativeLink::new(handle)))
    }
}

/// 通过操作系统枚举串口
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDiscovery;

impl PortDiscovery for NativeDiscovery {
    fn list_ports(&self) -> Vec<String> {
        match serialport::available_ports() {
            Ok(ports) => filter_ports(ports.into_iter().map(|info| info.port_name)),
            Err(e) => {
                tracing::warn!("[端口] 枚举串口失败: {}", e);
                Vec::new()
            }
        }
    }
}
