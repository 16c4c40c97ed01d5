/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/floor-server | 工作目录（日志等） |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | REALTIME_TCP_PORT | 8081 | 实时 TCP 端口 |
/// | SESSION_TTL_SECS | 7200 | 桌面临时键 TTL |
/// | PRE_ORDER_TTL_SECS | 86400 | 线上订单键 TTL |
/// | LOG_LEVEL | info | 日志级别 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 REALTIME_TCP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 实时 TCP 端口 (客户端直连)
    pub realtime_tcp_port: u16,
    /// 桌面临时键 TTL（秒）
    pub session_ttl_secs: u64,
    /// 线上订单键 TTL（秒）
    pub pre_order_ttl_secs: u64,
    /// 日志级别: trace | debug | info | warn | error
    pub log_level: String,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/floor-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            realtime_tcp_port: std::env::var("REALTIME_TCP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7200),
            pre_order_ttl_secs: std::env::var("PRE_ORDER_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(86400),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        realtime_tcp_port: u16,
    ) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.realtime_tcp_port = realtime_tcp_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
