//! Floor Server - 餐厅楼面管理实时后端
//!
//! # 架构概述
//!
//! 核心是实时订单/厨房协调引擎：让尚未落库的点单草稿在三类独立
//! 消费组之间保持同步 —— 桌面会话、分区厨房工位、staff 仪表盘，
//! 持久记录只在明确的检查点写入。
//!
//! # 模块结构
//!
//! ```text
//! floor-server/src/
//! ├── core/          # 配置、状态、服务器组装
//! ├── session/       # 临时会话存储 + 类型化键
//! ├── hub/           # 命名组广播
//! ├── realtime/      # 入站事件分发 + TCP 传输
//! ├── orders/        # 草稿、厨房路由、生命周期、账本
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志、时间
//! ```

pub mod api;
pub mod core;
pub mod hub;
pub mod orders;
pub mod realtime;
pub mod session;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use hub::{BroadcastHub, ConnectionHandle};
pub use orders::{DraftManager, KitchenRouter, LifecycleCoordinator, StaffLedger};
pub use realtime::EventDispatcher;
pub use session::{Keys, SessionStore};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    let log_dir = format!("{}/logs", config.work_dir);
    std::fs::create_dir_all(&log_dir)?;
    init_logger_with_file(Some(&config.log_level), Some(&log_dir));
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ______
   / ____/___  ____  _____
  / /_  / __ \/ __ \/ ___/
 / __/ / /_/ / /_/ / /
/_/    \____/\____/_/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
