//! TTL-bearing in-process key/value store
//!
//! # 契约
//!
//! - `get(key) -> value | absent`，缺失永远等价于"空集合"，不是错误
//! - `set(key, value, ttl?)`，`delete(key)`
//! - `update(key, f)` 在该键的 map entry 锁内执行读-改-写，
//!   消除进程内的丢失更新（列表追加、过滤回写等）
//!
//! 过期采用惰性检查（读时）加周期清扫（后台任务）。

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::keys::TypedKey;
use crate::utils::now_millis;

/// 清扫间隔
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    /// 过期时刻（毫秒），None 表示永不过期
    expires_at: Option<i64>,
}

impl Entry {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Keyed, TTL-bearing shared state
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: DashMap<String, Entry>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取并反序列化；缺失或已过期返回 None
    pub fn get<T: DeserializeOwned>(&self, key: &TypedKey<T>) -> Option<T> {
        let raw = {
            let entry = self.entries.get(key.as_str())?;
            if entry.is_expired(now_millis()) {
                drop(entry);
                self.entries.remove(key.as_str());
                return None;
            }
            entry.value.clone()
        };
        match serde_json::from_value(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key = key.as_str(), error = %e, "Stored value failed to decode, dropping");
                self.entries.remove(key.as_str());
                None
            }
        }
    }

    /// 写入，TTL 取自键族定义
    pub fn set<T: Serialize>(&self, key: &TypedKey<T>, value: &T) {
        let value = serde_json::to_value(value).expect("Failed to serialize session value");
        self.entries.insert(
            key.as_str().to_string(),
            Entry {
                value,
                expires_at: key.ttl().map(|ttl| now_millis() + ttl.as_millis() as i64),
            },
        );
    }

    pub fn delete<T>(&self, key: &TypedKey<T>) {
        self.entries.remove(key.as_str());
    }

    pub fn exists<T>(&self, key: &TypedKey<T>) -> bool {
        self.entries
            .get(key.as_str())
            .is_some_and(|e| !e.is_expired(now_millis()))
    }

    /// 原子读-改-写
    ///
    /// 在该键的 entry 锁内执行 `f`（缺失时以 `T::default()` 起步），
    /// 写回并返回更新后的值。闭包内不得再访问本 store 的其他键。
    pub fn update<T, R>(&self, key: &TypedKey<T>, f: impl FnOnce(&mut T) -> R) -> (T, R)
    where
        T: Serialize + DeserializeOwned + Default + Clone,
    {
        let now = now_millis();
        let mut slot = self
            .entries
            .entry(key.as_str().to_string())
            .or_insert_with(|| Entry {
                value: Value::Null,
                expires_at: None,
            });

        let mut current: T = if slot.value.is_null() || slot.is_expired(now) {
            T::default()
        } else {
            serde_json::from_value(slot.value.clone()).unwrap_or_default()
        };

        let out = f(&mut current);
        slot.value =
            serde_json::to_value(&current).expect("Failed to serialize session value");
        slot.expires_at = key.ttl().map(|ttl| now + ttl.as_millis() as i64);
        (current, out)
    }

    /// 移除所有已过期条目，返回清除数量
    pub fn sweep(&self) -> usize {
        let now = now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    /// 启动周期清扫任务，直到收到关闭信号
    pub fn spawn_sweeper(self: &std::sync::Arc<Self>, shutdown: CancellationToken) {
        let store = std::sync::Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("Session sweeper shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = store.sweep();
                        if removed > 0 {
                            tracing::debug!(removed, "Swept expired session keys");
                        }
                    }
                }
            }
        });
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
