use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::Config;
use crate::hub::BroadcastHub;
use crate::orders::{
    DraftManager, InMemoryOrderStore, InMemoryTableRegistry, LifecycleCoordinator, OrderStore,
    StaffLedger, TableRegistry,
};
use crate::realtime::EventDispatcher;
use crate::session::{Keys, SessionStore};

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | sessions | 临时会话存储 |
/// | keys | 会话键构造器 |
/// | hub | 广播 hub |
/// | orders | 持久订单存储（seam） |
/// | tables | 桌台注册表（seam） |
/// | lifecycle | 生命周期协调器 |
/// | drafts | 草稿管理器 |
/// | ledger | staff 通知账本 |
/// | dispatcher | 入站事件分发器 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 临时会话存储
    pub sessions: Arc<SessionStore>,
    /// 会话键构造器
    pub keys: Keys,
    /// 广播 hub
    pub hub: Arc<BroadcastHub>,
    /// 持久订单存储
    pub orders: Arc<dyn OrderStore>,
    /// 桌台注册表
    pub tables: Arc<dyn TableRegistry>,
    /// 生命周期协调器 (唯一写持久层的组件)
    pub lifecycle: LifecycleCoordinator,
    /// 草稿管理器
    pub drafts: DraftManager,
    /// staff 通知账本
    pub ledger: StaffLedger,
    /// 入站事件分发器
    pub dispatcher: Arc<EventDispatcher>,
    /// 优雅关闭令牌
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态（内存持久层）
    pub fn initialize(config: &Config) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(InMemoryTableRegistry::new()),
        )
    }

    /// 用外部持久层协作者组装状态
    pub fn with_collaborators(
        config: &Config,
        orders: Arc<dyn OrderStore>,
        tables: Arc<dyn TableRegistry>,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let keys = Keys::from_config(config);
        let hub = Arc::new(BroadcastHub::new());

        let lifecycle = LifecycleCoordinator::new(
            sessions.clone(),
            keys,
            hub.clone(),
            orders.clone(),
            tables.clone(),
        );
        let ledger = StaffLedger::new(sessions.clone(), keys, hub.clone());
        let drafts = DraftManager::new(
            sessions.clone(),
            keys,
            hub.clone(),
            tables.clone(),
            lifecycle.clone(),
            ledger.clone(),
        );
        let dispatcher = Arc::new(EventDispatcher::new(
            sessions.clone(),
            keys,
            hub.clone(),
            drafts.clone(),
            lifecycle.clone(),
            ledger.clone(),
        ));

        Self {
            config: config.clone(),
            sessions,
            keys,
            hub,
            orders,
            tables,
            lifecycle,
            drafts,
            ledger,
            dispatcher,
            shutdown: CancellationToken::new(),
        }
    }

    /// 启动后台任务（过期清扫）
    pub fn start_background_tasks(&self) {
        self.sessions.spawn_sweeper(self.shutdown.clone());
    }

    /// 测试用状态（默认配置，内存持久层）
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::initialize(&Config::with_overrides("/tmp/floor-server-test", 0, 0))
    }
}
