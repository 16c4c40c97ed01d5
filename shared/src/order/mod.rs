//! Order domain types
//!
//! The live draft / batch / ticket types that flow between the table
//! session, the kitchen queues and the staff dashboard, plus the
//! durable order document and its status machines.

pub mod item;
pub mod notify;
pub mod record;
pub mod session;
pub mod status;
pub mod ticket;

// Re-exports
pub use item::{ItemVariant, OrderItem, Topping, sanitize_items};
pub use notify::{DeliveryEntry, OnlineOrderRecord, StaffNotification, TrackingEvent};
pub use record::{Customer, Order, OrderPatch};
pub use session::{Batch, OrderDraft};
pub use status::{PaymentStatus, ProgressStatus, StatusTarget, TableStatus};
pub use ticket::{KitchenTicket, OrderOrigin, UNKNOWN_AREA, normalize_area};
