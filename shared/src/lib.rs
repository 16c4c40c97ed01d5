//! Shared types for the floor-management backend
//!
//! Domain and wire types used by both the server and clients:
//! order drafts, batches, kitchen tickets, staff notifications,
//! the progress-status machine and the realtime event envelope.

pub mod message;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Realtime re-exports (for convenient access)
pub use message::{ClientEvent, Envelope, ServerEvent};
pub use order::{OrderDraft, OrderItem, ProgressStatus, StatusTarget};
