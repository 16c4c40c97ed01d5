//! Order coordination services
//!
//! 实时订单协调的五个服务：草稿管理、厨房路由、生命周期协调、
//! staff 通知账本，以及两个持久层 seam（订单、桌台）。

pub mod draft;
pub mod kitchen;
pub mod ledger;
pub mod lifecycle;
pub mod registry;
pub mod store;

pub use draft::DraftManager;
pub use kitchen::{CompletionOutcome, KitchenRouter};
pub use ledger::StaffLedger;
pub use lifecycle::LifecycleCoordinator;
pub use registry::{InMemoryTableRegistry, TableInfo, TableRegistry};
pub use store::{InMemoryOrderStore, OrderStore};

use serde::Serialize;
use shared::order::{Batch, KitchenTicket, OrderDraft, ProgressStatus};

/// Staff aggregate view of one table
///
/// `dataTable` / `dataTableUpdated` 的载荷，也是 `getDetailTable`
/// 的应答。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDetail {
    pub table_number: String,
    /// 未提交草稿
    pub current_order: OrderDraft,
    /// 首单快照
    pub first_order: OrderDraft,
    /// 未做完的加单批次
    pub batches: Vec<Batch>,
    /// 已完成工单
    pub completed_items: Vec<KitchenTicket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_status: Option<ProgressStatus>,
}
