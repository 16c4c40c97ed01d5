//! Dining-table registry seam
//!
//! 桌台与订单一样来自外部持久层；这里只需要座位数、编号与状态机。
//! 状态流转: empty -> occupied -> cleaning -> empty。

use async_trait::async_trait;
use dashmap::DashMap;
use shared::order::TableStatus;

use crate::utils::{AppError, AppResult};

/// Durable dining-table document
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub id: String,
    pub table_number: String,
    pub seats: u32,
    pub status: TableStatus,
    /// 当前关联的未结账订单
    pub current_order: Option<String>,
}

/// Dining-table persistence contract
#[async_trait]
pub trait TableRegistry: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TableInfo>>;

    async fn find_by_number(&self, table_number: &str) -> AppResult<Option<TableInfo>>;

    /// 更新桌台状态；桌台不存在返回 NotFound
    async fn set_status(&self, id: &str, status: TableStatus) -> AppResult<TableInfo>;

    /// 绑定 / 解绑当前订单
    async fn set_current_order(&self, id: &str, order_id: Option<String>)
    -> AppResult<TableInfo>;
}

/// In-memory registry (tests / single-node runs)
#[derive(Debug, Default)]
pub struct InMemoryTableRegistry {
    tables: DashMap<String, TableInfo>,
}

impl InMemoryTableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 测试便捷构造：预置一张桌台
    pub fn seed(&self, id: &str, table_number: &str, seats: u32) {
        self.tables.insert(
            id.to_string(),
            TableInfo {
                id: id.to_string(),
                table_number: table_number.to_string(),
                seats,
                status: TableStatus::Empty,
                current_order: None,
            },
        );
    }
}

#[async_trait]
impl TableRegistry for InMemoryTableRegistry {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TableInfo>> {
        Ok(self.tables.get(id).map(|t| t.clone()))
    }

    async fn find_by_number(&self, table_number: &str) -> AppResult<Option<TableInfo>> {
        Ok(self
            .tables
            .iter()
            .find(|t| t.table_number == table_number)
            .map(|t| t.clone()))
    }

    async fn set_status(&self, id: &str, status: TableStatus) -> AppResult<TableInfo> {
        let mut table = self
            .tables
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
        table.status = status;
        Ok(table.clone())
    }

    async fn set_current_order(
        &self,
        id: &str,
        order_id: Option<String>,
    ) -> AppResult<TableInfo> {
        let mut table = self
            .tables
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
        table.current_order = order_id;
        Ok(table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_status_round_trip() {
        let reg = InMemoryTableRegistry::new();
        reg.seed("t1", "5", 4);

        reg.set_status("t1", TableStatus::Occupied).await.unwrap();
        let table = reg.find_by_number("5").await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Occupied);

        let table = reg.set_status("t1", TableStatus::Cleaning).await.unwrap();
        assert_eq!(table.status, TableStatus::Cleaning);
    }

    #[tokio::test]
    async fn test_unknown_table_is_not_found() {
        let reg = InMemoryTableRegistry::new();
        let err = reg.set_status("nope", TableStatus::Empty).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
