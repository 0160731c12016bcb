//! Per-member WebSocket fan-out for real-time notification delivery.
//!
//! Each member may hold any number of concurrently open live sessions
//! (browser tabs, devices). Sessions are grouped under the member's opaque
//! identity string and every event published to that identity is routed to
//! all of its sessions.
//!
//! # Architecture
//!
//! - **Dual-index registry**: O(1) lookups for both session cleanup and
//!   member-scoped routing via separate DashMap indices.
//! - **Best-effort delivery**: events are ephemeral. Publishing to a member
//!   with no open sessions is a silent success; the durable notification row
//!   is the source of truth and is re-fetched over HTTP.
//! - **Implicit leave**: a session whose channel is gone is pruned during
//!   routing without affecting sibling sessions.
//!
//! # Modules
//!
//! - `connection`: SessionRegistry with dual-index architecture and type-safe SessionId
//! - `manager`: join/leave/publish facade (delegates to SessionRegistry)
//! - `message`: typed inbound and outbound wire frames

pub mod connection;
pub mod manager;
pub mod message;

pub use connection::{MemberId, SessionId};
pub use manager::Manager;
pub use message::{InboundMessage, OutboundEvent};
