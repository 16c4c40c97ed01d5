//! Broadcast Hub - 命名组广播
//!
//! # 架构
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                BroadcastHub                  │
//! │  groups:      group -> {conn ids}            │
//! │  connections: conn id -> mpsc::Sender        │
//! └──────────────┬───────────────────────────────┘
//!                │ publish(group, event, data)
//!     ┌──────────┼──────────┐
//!     ▼          ▼          ▼
//! table:{n}  {area}:kitchen  staff
//! (餐桌客户端) (单区厨师)     (仪表盘)
//! ```
//!
//! Publish 是 fire-and-forget：空组不是错误，断开的连接在下一次
//! 发送失败时被摘除。

pub mod groups;

pub use groups::{STAFF_GROUP, kitchen_group, table_group};

use std::collections::HashSet;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use shared::message::{Envelope, ServerEvent};

/// 单个连接的服务器端状态
#[derive(Debug)]
struct Connection {
    tx: mpsc::UnboundedSender<Envelope>,
    groups: HashSet<String>,
}

/// 连接句柄，交给传输层写循环持有
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: String,
}

impl ConnectionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Named-group broadcast hub
#[derive(Debug, Default)]
pub struct BroadcastHub {
    /// group -> member connection ids
    groups: DashMap<String, HashSet<String>>,
    /// connection id -> sender + joined groups
    connections: DashMap<String, Connection>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册新连接，返回句柄和其出站接收端
    ///
    /// 每个连接自动加入以自身 id 命名的 identity 组（用于单播语义
    /// 与"离开除自身外所有组"的排除集）。
    pub fn register(&self) -> (ConnectionHandle, mpsc::UnboundedReceiver<Envelope>) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(
            id.clone(),
            Connection {
                tx,
                groups: HashSet::from([id.clone()]),
            },
        );
        self.groups
            .entry(id.clone())
            .or_default()
            .insert(id.clone());
        (ConnectionHandle { id }, rx)
    }

    /// 注销连接并脱离其所有组
    pub fn unregister(&self, conn: &ConnectionHandle) {
        if let Some((_, state)) = self.connections.remove(conn.id()) {
            for group in state.groups {
                self.remove_member(&group, conn.id());
            }
        }
    }

    /// 加入一个组
    pub fn join(&self, conn: &ConnectionHandle, group: &str) {
        let Some(mut state) = self.connections.get_mut(conn.id()) else {
            return;
        };
        if state.groups.insert(group.to_string()) {
            self.groups
                .entry(group.to_string())
                .or_default()
                .insert(conn.id().to_string());
        }
    }

    /// 离开一个组
    pub fn leave(&self, conn: &ConnectionHandle, group: &str) {
        if let Some(mut state) = self.connections.get_mut(conn.id())
            && state.groups.remove(group)
        {
            drop(state);
            self.remove_member(group, conn.id());
        }
    }

    /// 独占加入：离开除自身 identity 外的所有组后加入 `group`
    ///
    /// 厨师端切换厨房区域时使用，保证一个连接同时至多属于一个区域。
    pub fn join_exclusive(&self, conn: &ConnectionHandle, group: &str) {
        let old_groups: Vec<String> = match self.connections.get_mut(conn.id()) {
            Some(mut state) => {
                let old = state
                    .groups
                    .iter()
                    .filter(|g| g.as_str() != conn.id())
                    .cloned()
                    .collect();
                state.groups.retain(|g| g == conn.id());
                state.groups.insert(group.to_string());
                old
            }
            None => return,
        };
        for old in old_groups {
            self.remove_member(&old, conn.id());
        }
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(conn.id().to_string());
    }

    /// 组内广播，fire-and-forget
    pub fn publish<T: Serialize>(&self, group: &str, event: ServerEvent, data: &T) {
        let Some(members) = self.groups.get(group) else {
            return;
        };
        let envelope = Envelope::new(event, data);
        let mut dead = Vec::new();
        for member in members.iter() {
            match self.connections.get(member.as_str()) {
                Some(conn) => {
                    if conn.tx.send(envelope.clone()).is_err() {
                        dead.push(member.clone());
                    }
                }
                None => dead.push(member.clone()),
            }
        }
        drop(members);
        for id in dead {
            tracing::debug!(conn = %id, group, "Dropping dead hub member");
            self.remove_member(group, &id);
        }
    }

    /// 单连接回复
    pub fn reply<T: Serialize>(&self, conn: &ConnectionHandle, event: ServerEvent, data: &T) {
        if let Some(state) = self.connections.get(conn.id()) {
            let _ = state.tx.send(Envelope::new(event, data));
        }
    }

    /// 某组当前成员数（测试与日志用）
    pub fn group_size(&self, group: &str) -> usize {
        self.groups.get(group).map_or(0, |m| m.len())
    }

    fn remove_member(&self, group: &str, conn_id: &str) {
        if let Some(mut members) = self.groups.get_mut(group) {
            members.remove(conn_id);
            if members.is_empty() {
                drop(members);
                self.groups.remove_if(group, |_, m| m.is_empty());
            }
        }
    }
}
