//! Ephemeral Session Store - 带 TTL 的共享状态基座
//!
//! 所有实时组件通过本模块读写共享状态。键是不透明字符串，但访问
//! 一律经过 [`keys`] 的强类型构造器，杜绝裸字符串键。

pub mod keys;
pub mod store;

pub use keys::{Keys, TypedKey};
pub use store::SessionStore;
