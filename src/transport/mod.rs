//! 串口传输层
//!
//! 抽象出串口连接、打开和端口发现三个接缝，会话引擎只依赖这里的 trait。
//!
//! ## 模块结构
//! - `native` - 基于 `serialport` crate 的真实实现
//! - `mock` - 内存模拟端口（仅测试）

use std::io::{self, Read, Write};
use std::time::Duration;

pub mod native;

#[cfg(test)]
pub(crate) mod mock;

pub use native::{NativeConnector, NativeDiscovery, NativeLink};

/// 需要过滤掉的传统固定串口设备标识
const LEGACY_PORT_MARKER: &str = "ttyS";

/// 已打开的串口连接
///
/// 读线程持有一个克隆，写入和关闭由会话侧负责。
pub trait SerialLink: Read + Write + Send {
    /// 当前接收缓冲区中未读的字节数
    fn bytes_to_read(&self) -> io::Result<u32>;

    /// 克隆出一个指向同一设备的独立句柄（供读线程使用）
    fn try_clone_link(&self) -> io::Result<Box<dyn SerialLink>>;
}

/// 串口打开器
pub trait SerialConnector: Send + Sync {
    /// 以 8-N-1 帧格式和给定读超时打开端口
    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> io::Result<Box<dyn SerialLink>>;
}

/// 端口发现
pub trait PortDiscovery: Send + Sync {
    /// 返回当前可用的端口标识（已过滤、已排序）
    fn list_ports(&self) -> Vec<String>;
}

/// 过滤传统 `ttyS` 设备并排序去重
pub fn filter_ports<I, S>(ports: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut ports: Vec<String> = ports
        .into_iter()
        .map(Into::into)
        .filter(|port| !port.contains(LEGACY_PORT_MARKER))
        .collect();
    ports.sort();
    ports.dedup();
    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_ports_drops_legacy_devices() {
        let ports = filter_ports(["/dev/ttyUSB1", "/dev/ttyS0", "/dev/ttyACM0", "/dev/ttyS31"]);
        assert_eq!(ports, vec!["/dev/ttyACM0", "/dev/ttyUSB1"]);
    }

    #[test]
    fn test_filter_ports_sorts_and_dedups() {
        let ports = filter_ports(vec!["COM4".to_string(), "COM3".to_string(), "COM4".to_string()]);
        assert_eq!(ports, vec!["COM3", "COM4"]);
    }

    #[test]
    fn test_filter_ports_empty() {
        assert!(filter_ports(Vec::<String>::new()).is_empty());
    }
}
