//! 工具模块 - 错误、日志、时间

pub mod error;
pub mod logger;

pub use error::{AppError, AppResponse, AppResult, ok};
pub use shared::util::{now_iso, now_millis};
