//! Realtime layer
//!
//! 入站事件分发 + 长度前缀 JSON 帧的 TCP 传输，把连接接到广播
//! hub 上。

pub mod dispatcher;
pub mod transport;

pub use dispatcher::EventDispatcher;
pub use transport::start_realtime_server;
